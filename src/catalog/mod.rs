// Build catalog - discovery of APK builds across directory-listing sources

pub mod lister;
pub mod resolver;

use serde::{Deserialize, Serialize};

pub use lister::{extract_artifacts, HttpLister, LinkJoin, SourceLister};
pub use resolver::{Catalog, CatalogResolver, SourceBuilds, SourceEntry};

/// One discovered installer package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Decoded final path segment of the link, never empty
    pub name: String,
    /// Absolute fetchable address
    pub location: String,
}

/// A configured directory listing to scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
}

impl Source {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}
