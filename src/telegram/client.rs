use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::protocol::{ApiResponse, GetUpdates, SendDocument, SendMessage, Update};
use crate::error::{Result, ScenebotError};

const API_BASE: &str = "https://api.telegram.org";
const PARSE_MODE: &str = "Markdown";

/// Minimal Telegram Bot API client
pub struct BotClient {
    base: String,
    client: reqwest::Client,
}

impl BotClient {
    pub fn new(token: &str, poll_timeout_secs: u64) -> Self {
        Self::with_base_url(format!("{}/bot{}", API_BASE, token), poll_timeout_secs)
    }

    /// Client against an arbitrary API root (`<root>/<method>`)
    pub fn with_base_url(base: String, poll_timeout_secs: u64) -> Self {
        Self {
            base,
            client: reqwest::Client::builder()
                // Long polls hold the request open for poll_timeout_secs
                .timeout(Duration::from_secs(poll_timeout_secs + 15))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Long-poll for new message updates after `offset`
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let body = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        self.call("getUpdates", &body).await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let body = SendMessage {
            chat_id,
            text,
            parse_mode: PARSE_MODE,
        };
        self.call::<_, serde_json::Value>("sendMessage", &body)
            .await
            .map(|_| ())
    }

    /// Send a document by public URL or by existing file id
    pub async fn send_document(&self, chat_id: i64, document: &str, caption: &str) -> Result<()> {
        let body = SendDocument {
            chat_id,
            document,
            caption,
            parse_mode: PARSE_MODE,
        };
        self.call::<_, serde_json::Value>("sendDocument", &body)
            .await
            .map(|_| ())
    }

    async fn call<B: Serialize, T: DeserializeOwned>(&self, method: &str, body: &B) -> Result<T> {
        let url = format!("{}/{}", self.base, method);
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let parsed: ApiResponse<T> = serde_json::from_str(&text).map_err(|_| {
            ScenebotError::Telegram(format!("{} returned {}: {}", method, status, text))
        })?;

        if !parsed.ok {
            return Err(ScenebotError::Telegram(format!(
                "{} failed: {}",
                method,
                parsed.description.unwrap_or_else(|| status.to_string())
            )));
        }

        parsed
            .result
            .ok_or_else(|| ScenebotError::Telegram(format!("{} returned no result", method)))
    }
}
