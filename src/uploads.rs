// Upload registry - builds the admin uploaded directly, keyed by file name

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{Result, ScenebotError};

/// Persistent map of lowercase file name -> opaque Telegram file id
#[derive(Debug, Clone)]
pub struct UploadStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl UploadStore {
    /// Load the registry, starting empty if the file is missing or unreadable
    pub fn open(path: &Path) -> Self {
        match Self::load(path) {
            Ok(store) => store,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "upload registry unreadable, starting empty");
                Self {
                    path: path.to_path_buf(),
                    entries: BTreeMap::new(),
                }
            }
        }
    }

    /// Load the registry from disk; a missing file is an empty registry
    pub fn load(path: &Path) -> Result<Self> {
        let entries = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content).map_err(|e| {
                ScenebotError::Persistence(format!("Invalid {}: {}", path.display(), e))
            })?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Register (or overwrite) an upload and persist the whole map.
    ///
    /// Returns `Ok(false)` when the same pair was already stored. On a
    /// write failure the previous entry is restored before the error is
    /// returned.
    pub fn register(&mut self, name: &str, handle: &str) -> Result<bool> {
        let key = normalize(name);
        if key.is_empty() {
            return Err(ScenebotError::Persistence(
                "Cannot register an upload without a file name".into(),
            ));
        }
        if self.entries.get(&key).map(String::as_str) == Some(handle) {
            return Ok(false);
        }

        let previous = self.entries.insert(key.clone(), handle.to_string());
        if let Err(e) = self.save() {
            match previous {
                Some(old) => self.entries.insert(key, old),
                None => self.entries.remove(&key),
            };
            return Err(e);
        }

        info!(name = %key, "registered upload");
        Ok(true)
    }

    /// Drop an upload; `Ok(false)` if nothing was registered under `name`
    pub fn remove(&mut self, name: &str) -> Result<bool> {
        let key = normalize(name);
        let Some(previous) = self.entries.remove(&key) else {
            return Ok(false);
        };
        if let Err(e) = self.save() {
            self.entries.insert(key, previous);
            return Err(e);
        }
        Ok(true)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&normalize(name)).map(String::as_str)
    }

    /// First registered name (in sorted order) containing `keyword`
    pub fn find(&self, keyword: &str) -> Option<(&str, &str)> {
        let needle = keyword.to_lowercase();
        self.entries
            .iter()
            .find(|(name, _)| name.contains(&needle))
            .map(|(name, handle)| (name.as_str(), handle.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write to a sibling temp file, then rename over the registry
    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| persistence(&self.path, e))?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content).map_err(|e| persistence(&tmp_path, e))?;
        if let Err(e) = std::fs::rename(&tmp_path, &self.path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(persistence(&self.path, e));
        }
        Ok(())
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

fn persistence(path: &Path, e: std::io::Error) -> ScenebotError {
    ScenebotError::Persistence(format!("{}: {}", path.display(), e))
}
