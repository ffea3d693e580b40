use serde::{Deserialize, Serialize};

/// Envelope every Bot API method answers with
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub document: Option<Document>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub file_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GetUpdates<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
    pub allowed_updates: &'a [&'a str],
}

#[derive(Debug, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    pub parse_mode: &'a str,
}

/// `document` is either a public URL or a file id already on Telegram
#[derive(Debug, Serialize)]
pub struct SendDocument<'a> {
    pub chat_id: i64,
    pub document: &'a str,
    pub caption: &'a str,
    pub parse_mode: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_updates_with_text_and_document() {
        let raw = r#"{
            "ok": true,
            "result": [
                {"update_id": 10, "message": {"message_id": 1, "chat": {"id": 55, "type": "private"}, "text": "/list"}},
                {"update_id": 11, "message": {"message_id": 2, "chat": {"id": -100, "type": "channel"},
                    "document": {"file_id": "BQACAg", "file_name": "Scene7.apk", "file_size": 1024}}},
                {"update_id": 12, "edited_message": {"message_id": 3}}
            ]
        }"#;
        let response: ApiResponse<Vec<Update>> = serde_json::from_str(raw).unwrap();
        assert!(response.ok);
        let updates = response.result.unwrap();
        assert_eq!(updates.len(), 3);
        assert_eq!(updates[0].message.as_ref().unwrap().text.as_deref(), Some("/list"));
        let doc = updates[1].message.as_ref().unwrap().document.as_ref().unwrap();
        assert_eq!(doc.file_name.as_deref(), Some("Scene7.apk"));
        assert!(updates[2].message.is_none());
    }

    #[test]
    fn test_error_response() {
        let raw = r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#;
        let response: ApiResponse<bool> = serde_json::from_str(raw).unwrap();
        assert!(!response.ok);
        assert!(response.result.is_none());
        assert_eq!(response.description.as_deref(), Some("Unauthorized"));
    }
}
