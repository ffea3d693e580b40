use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::Artifact;
use crate::error::Result;

/// How a relative link is turned into an absolute location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkJoin {
    /// Append the link to the source address verbatim (`base + link`)
    #[default]
    Concat,
    /// Resolve the link against the source address (RFC 3986)
    Resolve,
}

/// Retrieves one directory listing and extracts its artifacts.
///
/// Implementations never fail: an unreachable or unparsable source
/// contributes an empty list.
#[async_trait]
pub trait SourceLister: Send + Sync {
    async fn list(&self, url: &str) -> Vec<Artifact>;
}

/// Lister backed by a plain HTTP GET of the listing page
pub struct HttpLister {
    client: reqwest::Client,
    join: LinkJoin,
}

impl HttpLister {
    pub fn new(fetch_timeout: Duration, join: LinkJoin) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(fetch_timeout)
                .user_agent(concat!("scenebot/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            join,
        }
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl SourceLister for HttpLister {
    async fn list(&self, url: &str) -> Vec<Artifact> {
        match self.fetch(url).await {
            Ok(page) => {
                let artifacts = extract_artifacts(&page, url, self.join);
                debug!(source = url, count = artifacts.len(), "listed source");
                artifacts
            }
            Err(e) => {
                warn!(source = url, error = %e, "failed to fetch listing");
                Vec::new()
            }
        }
    }
}

fn apk_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"href="([^"]*?\.apk)""#).expect("static regex"))
}

/// Scan a listing page for `.apk` hyperlinks, in document order.
///
/// Links whose name cannot be derived (empty, bad percent-escape, invalid
/// UTF-8) or whose location cannot be resolved are skipped.
pub fn extract_artifacts(page: &str, base: &str, join: LinkJoin) -> Vec<Artifact> {
    apk_link_re()
        .captures_iter(page)
        .filter_map(|caps| {
            let link = caps.get(1)?.as_str();
            let name = link_name(link)?;
            let location = join_location(base, link, join)?;
            Some(Artifact { name, location })
        })
        .collect()
}

/// Decoded final path segment of a link
fn link_name(link: &str) -> Option<String> {
    let segment = link.rsplit('/').next()?;
    let name = percent_decode(segment)?;
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn join_location(base: &str, link: &str, join: LinkJoin) -> Option<String> {
    if link.starts_with("http") {
        return Some(link.to_string());
    }
    match join {
        LinkJoin::Concat => Some(format!("{}{}", base, link)),
        LinkJoin::Resolve => reqwest::Url::parse(base)
            .and_then(|url| url.join(link))
            .map(|url| url.to_string())
            .ok(),
    }
}

/// Strict percent-decoding: every `%` must start a two-digit hex escape and
/// the decoded bytes must be UTF-8. `+` is left alone.
fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let well_formed = bytes.iter().enumerate().all(|(i, &b)| {
        b != b'%'
            || (bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    });
    if !well_formed {
        return None;
    }
    percent_decode_str(input)
        .decode_utf8()
        .ok()
        .map(|name| name.into_owned())
}
