use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::{LinkJoin, Source};
use crate::error::{Result, ScenebotError};

/// Per-request bound on fetching a single listing page
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
/// Bound on a whole catalog query across all sources
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 45;
/// Long-poll wait passed to getUpdates
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

const DEFAULT_SOURCE_BASE: &str = "http://download.omarea.com";

/// The scene listings the bot has always served
pub fn default_sources() -> Vec<Source> {
    (5..=9)
        .map(|n| {
            Source::new(
                format!("scene{}", n),
                format!("{}/scene{}/", DEFAULT_SOURCE_BASE, n),
            )
        })
        .collect()
}

/// On-disk representation of config.json; every field is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_join: Option<LinkJoin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_aliases: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_chat_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Listings to scan, in priority order
    pub sources: Vec<Source>,
    pub fetch_timeout_secs: u64,
    pub query_timeout_secs: u64,
    pub poll_timeout_secs: u64,
    pub link_join: LinkJoin,
    /// Extra command words that mean "latest"
    pub latest_aliases: Vec<String>,
    pub bot_token: Option<String>,
    /// Chat whose document uploads are registered
    pub admin_chat_id: Option<i64>,
    /// Where the upload registry lives
    pub data_dir: PathBuf,
}

impl Config {
    /// Load defaults, overlay config.json and environment, then validate.
    pub fn load(path_override: Option<&Path>) -> Result<Self> {
        let file = match path_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ScenebotError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                read_config_file(path)?
            }
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    read_config_file(&path)?
                } else {
                    ConfigFile::default()
                }
            }
        };

        let default_data_dir = dirs::data_dir()
            .map(|d| d.join("scenebot"))
            .ok_or_else(|| ScenebotError::Config("Could not determine data directory".into()))?;

        let config = Self::resolve(file, default_data_dir, |key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Path to config.json
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ScenebotError::Config("Could not determine config directory".into()))?;
        Ok(config_dir.join("scenebot").join("config.json"))
    }

    /// Merge file values over defaults, then environment over both.
    ///
    /// Precedence per field: env var > config.json > built-in default.
    pub fn resolve(
        file: ConfigFile,
        default_data_dir: PathBuf,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let bot_token = env("SCENEBOT_BOT_TOKEN")
            .or_else(|| env("BOT_TOKEN"))
            .filter(|t| !t.trim().is_empty())
            .or(file.bot_token);

        let admin_chat_id = match env("SCENEBOT_ADMIN_CHAT_ID") {
            Some(raw) => Some(raw.trim().parse::<i64>().map_err(|_| {
                ScenebotError::Config(format!("SCENEBOT_ADMIN_CHAT_ID is not a chat id: {}", raw))
            })?),
            None => file.admin_chat_id,
        };

        let data_dir = env("SCENEBOT_DATA_DIR")
            .map(PathBuf::from)
            .or(file.data_dir)
            .unwrap_or(default_data_dir);

        Ok(Config {
            sources: file.sources.unwrap_or_else(default_sources),
            fetch_timeout_secs: file.fetch_timeout_secs.unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),
            query_timeout_secs: file.query_timeout_secs.unwrap_or(DEFAULT_QUERY_TIMEOUT_SECS),
            poll_timeout_secs: file.poll_timeout_secs.unwrap_or(DEFAULT_POLL_TIMEOUT_SECS),
            link_join: file.link_join.unwrap_or_default(),
            latest_aliases: file
                .latest_aliases
                .unwrap_or_else(|| vec!["terbaru".to_string()]),
            bot_token,
            admin_chat_id,
            data_dir,
        })
    }

    /// Startup checks; a config that fails here never serves a query
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(ScenebotError::Config("No sources configured".into()));
        }
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(ScenebotError::Config(format!(
                    "Source with URL {} has an empty name",
                    source.url
                )));
            }
            if !(source.url.starts_with("http://") || source.url.starts_with("https://")) {
                return Err(ScenebotError::Config(format!(
                    "Source '{}' must use an http(s) URL, got: {}",
                    source.name, source.url
                )));
            }
        }
        if self.fetch_timeout_secs == 0 || self.query_timeout_secs == 0 {
            return Err(ScenebotError::Config("Timeouts must be at least 1 second".into()));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn uploads_path(&self) -> PathBuf {
        self.data_dir.join("uploads.json")
    }

    pub fn require_bot_token(&self) -> Result<&str> {
        self.bot_token.as_deref().ok_or_else(|| {
            ScenebotError::Config(
                "No bot token found. Set SCENEBOT_BOT_TOKEN or add bot_token to config.json".into(),
            )
        })
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| ScenebotError::Config(format!("Invalid {}: {}", path.display(), e)))
}
