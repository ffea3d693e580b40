// Chat-facing layer: turns inbound messages into catalog queries and uploads

pub mod server;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::catalog::{Artifact, CatalogResolver};
use crate::config::Config;
use crate::error::ScenebotError;
use crate::intent::{parse_intent, Intent};
use crate::renderer::markdown;
use crate::telegram::protocol::Message;
use crate::uploads::UploadStore;

pub use server::run;

/// File attached to an inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub handle: String,
}

/// Transport-neutral view of one inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub chat_id: i64,
    pub text: Option<String>,
    pub document: Option<Attachment>,
}

impl Envelope {
    pub fn from_message(message: &Message) -> Self {
        Self {
            chat_id: message.chat.id,
            text: message.text.clone(),
            document: message.document.as_ref().map(|d| Attachment {
                file_name: d.file_name.clone().unwrap_or_default(),
                handle: d.file_id.clone(),
            }),
        }
    }
}

/// What to send back for one envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// Send the build at its public URL as a document
    Forward(Artifact),
    /// Re-send a previously uploaded file by its Telegram file id
    ForwardHandle { name: String, handle: String },
    /// Query ran fine but matched nothing
    NotFound(String),
    /// Nothing to answer
    Ignore,
}

pub struct Responder {
    resolver: CatalogResolver,
    uploads: Arc<Mutex<UploadStore>>,
    admin_chat_id: Option<i64>,
    latest_aliases: Vec<String>,
}

impl Responder {
    pub fn new(
        resolver: CatalogResolver,
        uploads: UploadStore,
        admin_chat_id: Option<i64>,
        latest_aliases: Vec<String>,
    ) -> Self {
        Self {
            resolver,
            uploads: Arc::new(Mutex::new(uploads)),
            admin_chat_id,
            latest_aliases,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            CatalogResolver::from_config(config),
            UploadStore::open(&config.uploads_path()),
            config.admin_chat_id,
            config.latest_aliases.clone(),
        )
    }

    pub async fn handle(&self, envelope: &Envelope) -> Reply {
        if let Some(document) = &envelope.document {
            if self.admin_chat_id == Some(envelope.chat_id) {
                return self.ingest(document).await;
            }
            debug!(chat_id = envelope.chat_id, "ignoring document from non-admin chat");
        }

        match envelope.text.as_deref() {
            Some(text) => self.answer(text).await,
            None => Reply::Ignore,
        }
    }

    /// Answer a text command
    pub async fn answer(&self, text: &str) -> Reply {
        match parse_intent(text, &self.latest_aliases) {
            Intent::Start => Reply::Text(markdown::WELCOME.to_string()),
            Intent::Enumerate => {
                let catalog = self.resolver.enumerate().await;
                Reply::Text(markdown::render_catalog(&catalog))
            }
            Intent::Latest => match self.resolver.latest().await {
                Some(artifact) => Reply::Text(markdown::render_latest(&artifact)),
                None => Reply::NotFound(markdown::NO_BUILDS.to_string()),
            },
            Intent::Find(keyword) => self.find(&keyword).await,
            Intent::Uploads => {
                let uploads = self.uploads.lock().await;
                Reply::Text(markdown::render_uploads(uploads.iter().map(|(name, _)| name)))
            }
            Intent::MissingKeyword => Reply::Text(markdown::DOWNLOAD_USAGE.to_string()),
            Intent::Unknown => Reply::Text(markdown::UNKNOWN_COMMAND.to_string()),
        }
    }

    /// Uploaded builds take precedence over scanned listings
    async fn find(&self, keyword: &str) -> Reply {
        let uploaded = {
            let uploads = self.uploads.lock().await;
            uploads
                .find(keyword)
                .map(|(name, handle)| (name.to_string(), handle.to_string()))
        };
        if let Some((name, handle)) = uploaded {
            return Reply::ForwardHandle { name, handle };
        }

        match self.resolver.find(keyword).await {
            Some(artifact) => Reply::Forward(artifact),
            None => Reply::NotFound(markdown::render_no_match(keyword)),
        }
    }

    /// The registry rewrite is file I/O, so it runs on the blocking pool
    async fn ingest(&self, document: &Attachment) -> Reply {
        let uploads = Arc::clone(&self.uploads);
        let (name, handle) = (document.file_name.clone(), document.handle.clone());
        let outcome = tokio::task::spawn_blocking(move || {
            uploads.blocking_lock().register(&name, &handle)
        })
        .await
        .unwrap_or_else(|e| Err(ScenebotError::Persistence(e.to_string())));

        match outcome {
            Ok(changed) => Reply::Text(markdown::render_registered(&document.file_name, changed)),
            Err(e) => {
                warn!(name = %document.file_name, error = %e, "upload registration failed");
                Reply::Text(markdown::render_register_failed(&document.file_name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Source, SourceLister};
    use async_trait::async_trait;
    use std::time::Duration;
    use tempfile::TempDir;

    const ADMIN: i64 = -1001;
    const USER: i64 = 77;

    /// Every source lists the same names under its own URL
    struct FixedLister(Vec<&'static str>);

    #[async_trait]
    impl SourceLister for FixedLister {
        async fn list(&self, url: &str) -> Vec<Artifact> {
            self.0
                .iter()
                .map(|name| Artifact {
                    name: name.to_string(),
                    location: format!("{}{}", url, name),
                })
                .collect()
        }
    }

    fn responder(dir: &TempDir, names: Vec<&'static str>) -> Responder {
        let resolver = CatalogResolver::new(
            vec![Source::new("scene7", "http://example.com/scene7/")],
            Arc::new(FixedLister(names)),
            Duration::from_secs(5),
        );
        Responder::new(
            resolver,
            UploadStore::open(&dir.path().join("uploads.json")),
            Some(ADMIN),
            vec!["terbaru".to_string()],
        )
    }

    fn text(chat_id: i64, text: &str) -> Envelope {
        Envelope {
            chat_id,
            text: Some(text.to_string()),
            document: None,
        }
    }

    fn upload(chat_id: i64, name: &str, handle: &str) -> Envelope {
        Envelope {
            chat_id,
            text: None,
            document: Some(Attachment {
                file_name: name.to_string(),
                handle: handle.to_string(),
            }),
        }
    }

    #[tokio::test]
    async fn test_start_and_unknown() {
        let dir = TempDir::new().unwrap();
        let bot = responder(&dir, vec![]);
        assert_eq!(
            bot.handle(&text(USER, "/start")).await,
            Reply::Text(markdown::WELCOME.to_string())
        );
        assert_eq!(
            bot.handle(&text(USER, "what")).await,
            Reply::Text(markdown::UNKNOWN_COMMAND.to_string())
        );
    }

    #[tokio::test]
    async fn test_latest_and_localized_alias() {
        let dir = TempDir::new().unwrap();
        let bot = responder(&dir, vec!["Scene-a.apk", "Scene-b.apk"]);
        let expected = Reply::Text(
            "🆕 *Latest Build:*\n📦 Scene-b.apk\n🔗 http://example.com/scene7/Scene-b.apk".into(),
        );
        assert_eq!(bot.handle(&text(USER, "/latest")).await, expected);
        assert_eq!(bot.handle(&text(USER, "/terbaru")).await, expected);
    }

    #[tokio::test]
    async fn test_latest_not_found() {
        let dir = TempDir::new().unwrap();
        let bot = responder(&dir, vec![]);
        assert_eq!(
            bot.handle(&text(USER, "/latest")).await,
            Reply::NotFound(markdown::NO_BUILDS.to_string())
        );
    }

    #[tokio::test]
    async fn test_download_forwards_catalog_match() {
        let dir = TempDir::new().unwrap();
        let bot = responder(&dir, vec!["Scene-lite.apk", "Scene-pro.apk"]);
        match bot.handle(&text(USER, "/download PRO")).await {
            Reply::Forward(artifact) => {
                assert_eq!(artifact.location, "http://example.com/scene7/Scene-pro.apk")
            }
            other => panic!("unexpected reply: {:?}", other),
        }
        assert_eq!(
            bot.handle(&text(USER, "/download nothing")).await,
            Reply::NotFound("No build found matching: *nothing*".into())
        );
        assert_eq!(
            bot.handle(&text(USER, "/download")).await,
            Reply::Text(markdown::DOWNLOAD_USAGE.to_string())
        );
    }

    #[tokio::test]
    async fn test_admin_upload_is_registered_and_served_first() {
        let dir = TempDir::new().unwrap();
        let bot = responder(&dir, vec!["Scene-pro.apk"]);

        let reply = bot.handle(&upload(ADMIN, "Scene-Pro.apk", "file-xyz")).await;
        assert_eq!(reply, Reply::Text("✅ Registered *Scene-Pro.apk*".into()));

        assert_eq!(
            bot.handle(&text(USER, "/download pro")).await,
            Reply::ForwardHandle {
                name: "scene-pro.apk".into(),
                handle: "file-xyz".into()
            }
        );

        let reloaded = UploadStore::load(&dir.path().join("uploads.json")).unwrap();
        assert_eq!(reloaded.get("scene-pro.apk"), Some("file-xyz"));
    }

    #[tokio::test]
    async fn test_repeat_upload_reports_unchanged() {
        let dir = TempDir::new().unwrap();
        let bot = responder(&dir, vec![]);
        bot.handle(&upload(ADMIN, "a.apk", "h")).await;
        assert_eq!(
            bot.handle(&upload(ADMIN, "A.apk", "h")).await,
            Reply::Text("✅ *A.apk* was already registered".into())
        );
    }

    #[tokio::test]
    async fn test_non_admin_upload_ignored() {
        let dir = TempDir::new().unwrap();
        let bot = responder(&dir, vec![]);
        assert_eq!(bot.handle(&upload(USER, "evil.apk", "h")).await, Reply::Ignore);
        assert_eq!(
            bot.handle(&text(USER, "/uploads")).await,
            Reply::Text("No uploads registered.".into())
        );
    }

    #[tokio::test]
    async fn test_upload_without_file_name_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let bot = responder(&dir, vec![]);
        match bot.handle(&upload(ADMIN, "", "h")).await {
            Reply::Text(msg) => assert!(msg.starts_with("❌ Could not register")),
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_uploads_are_all_persisted() {
        let dir = TempDir::new().unwrap();
        let bot = responder(&dir, vec![]);

        let upload_a = upload(ADMIN, "a.apk", "h1");
        let upload_b = upload(ADMIN, "b.apk", "h2");
        let (a, b) = tokio::join!(bot.handle(&upload_a), bot.handle(&upload_b));
        assert_eq!(a, Reply::Text("✅ Registered *a.apk*".into()));
        assert_eq!(b, Reply::Text("✅ Registered *b.apk*".into()));

        let reloaded = UploadStore::load(&dir.path().join("uploads.json")).unwrap();
        assert_eq!(reloaded.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_persist_reports_and_keeps_registry() {
        let dir = TempDir::new().unwrap();
        // Parent of the registry is a regular file, so the write fails
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let bot = Responder::new(
            CatalogResolver::new(
                vec![Source::new("scene7", "http://example.com/scene7/")],
                Arc::new(FixedLister(vec![])),
                Duration::from_secs(5),
            ),
            UploadStore::open(&blocker.join("uploads.json")),
            Some(ADMIN),
            vec![],
        );

        assert_eq!(
            bot.handle(&upload(ADMIN, "a.apk", "h1")).await,
            Reply::Text(markdown::render_register_failed("a.apk"))
        );
        assert_eq!(
            bot.handle(&text(USER, "/uploads")).await,
            Reply::Text("No uploads registered.".into())
        );
    }
}
