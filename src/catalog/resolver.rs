use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::lister::{HttpLister, SourceLister};
use super::{Artifact, Source};
use crate::config::Config;

/// Builds found for one source, with an explicit marker for "nothing there"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceBuilds {
    Found(Vec<Artifact>),
    NoBuilds,
}

impl SourceBuilds {
    fn from_artifacts(artifacts: Vec<Artifact>) -> Self {
        if artifacts.is_empty() {
            SourceBuilds::NoBuilds
        } else {
            SourceBuilds::Found(artifacts)
        }
    }

    pub fn artifacts(&self) -> &[Artifact] {
        match self {
            SourceBuilds::Found(artifacts) => artifacts,
            SourceBuilds::NoBuilds => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub source: Source,
    pub builds: SourceBuilds,
}

/// Result of scanning every configured source once, in declared order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    entries: Vec<SourceEntry>,
}

impl Catalog {
    pub fn from_listings(listings: impl IntoIterator<Item = (Source, Vec<Artifact>)>) -> Self {
        let entries = listings
            .into_iter()
            .map(|(source, artifacts)| SourceEntry {
                source,
                builds: SourceBuilds::from_artifacts(artifacts),
            })
            .collect();
        Self { entries }
    }

    /// Catalog where every source is present but contributed nothing
    pub fn empty(sources: &[Source]) -> Self {
        Self::from_listings(sources.iter().cloned().map(|s| (s, Vec::new())))
    }

    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    pub fn artifact_count(&self) -> usize {
        self.entries.iter().map(|e| e.builds.artifacts().len()).sum()
    }

    /// Lexicographically greatest build, chosen per source first.
    ///
    /// Each source contributes its own maximum by name; the winner is the
    /// greatest of those maxima, and on equal names the earlier source wins.
    /// Plain string ordering, so `v1.0.10` ranks below `v1.0.2`.
    pub fn latest(&self) -> Option<&Artifact> {
        let mut best: Option<&Artifact> = None;
        for entry in &self.entries {
            let mut sorted: Vec<&Artifact> = entry.builds.artifacts().iter().collect();
            sorted.sort_by(|a, b| a.name.cmp(&b.name));
            let Some(current) = sorted.last().copied() else {
                continue;
            };
            let better = match best {
                Some(b) => current.name > b.name,
                None => true,
            };
            if better {
                best = Some(current);
            }
        }
        best
    }

    /// First build whose name contains `keyword`, ignoring case
    pub fn find(&self, keyword: &str) -> Option<&Artifact> {
        let needle = keyword.to_lowercase();
        self.entries
            .iter()
            .flat_map(|e| e.builds.artifacts())
            .find(|a| a.name.to_lowercase().contains(&needle))
    }
}

/// Answers catalog queries by scanning every source afresh
pub struct CatalogResolver {
    sources: Vec<Source>,
    lister: Arc<dyn SourceLister>,
    query_timeout: Duration,
}

impl CatalogResolver {
    pub fn new(sources: Vec<Source>, lister: Arc<dyn SourceLister>, query_timeout: Duration) -> Self {
        Self {
            sources,
            lister,
            query_timeout,
        }
    }

    /// Resolver over the configured sources using the HTTP lister
    pub fn from_config(config: &Config) -> Self {
        let lister = HttpLister::new(config.fetch_timeout(), config.link_join);
        Self::new(
            config.sources.clone(),
            Arc::new(lister),
            config.query_timeout(),
        )
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Every source with its builds, including sources that have none
    pub async fn enumerate(&self) -> Catalog {
        self.collect().await
    }

    pub async fn latest(&self) -> Option<Artifact> {
        self.collect().await.latest().cloned()
    }

    pub async fn find(&self, keyword: &str) -> Option<Artifact> {
        self.collect().await.find(keyword).cloned()
    }

    /// Fan out one listing task per source and join them in declared order.
    ///
    /// If the query deadline passes, outstanding tasks are aborted and an
    /// empty catalog is returned instead of a partial one.
    async fn collect(&self) -> Catalog {
        let handles: Vec<_> = self
            .sources
            .iter()
            .map(|source| {
                let lister = Arc::clone(&self.lister);
                let url = source.url.clone();
                tokio::spawn(async move { lister.list(&url).await })
            })
            .collect();
        let aborts: Vec<_> = handles.iter().map(|h| h.abort_handle()).collect();

        let gather = async {
            let mut listings = Vec::with_capacity(handles.len());
            for (source, handle) in self.sources.iter().zip(handles) {
                let artifacts = match handle.await {
                    Ok(artifacts) => artifacts,
                    Err(e) => {
                        warn!(source = %source.name, error = %e, "listing task failed");
                        Vec::new()
                    }
                };
                listings.push((source.clone(), artifacts));
            }
            listings
        };

        match tokio::time::timeout(self.query_timeout, gather).await {
            Ok(listings) => {
                let catalog = Catalog::from_listings(listings);
                debug!(
                    sources = catalog.entries().len(),
                    artifacts = catalog.artifact_count(),
                    "catalog collected"
                );
                catalog
            }
            Err(_) => {
                for abort in aborts {
                    abort.abort();
                }
                warn!(
                    timeout_secs = self.query_timeout.as_secs_f64(),
                    "catalog query timed out"
                );
                Catalog::empty(&self.sources)
            }
        }
    }
}
