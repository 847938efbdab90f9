//! Refresh orchestration: scan, skip current entries, fetch the rest, merge
//!
//! Each repository whose cached `pushed_at` differs from the scanned one runs
//! its own chain (manifest lookup, version resolution, download). Chains run as
//! separate tasks with at most `concurrency` of them in flight. Their outcomes
//! are merged into the store and the answer set from the calling task only, and
//! the store is flushed once at the end.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::RefreshError;
use crate::package::fetcher::ArtifactFetcher;
use crate::package::npm::NpmRegistry;
use crate::package::resolver::{VersionResolver, resolver_for};
use crate::source::github::GitHubScanner;
use crate::source::scanner::RepositoryScanner;
use crate::source::types::RepositoryRecord;
use crate::store::json_store::{DocumentStore, JsonStore};
use crate::store::types::{DocumentEntry, DocumentSet};

/// Result of one repository's chain
#[derive(Debug)]
pub enum RepositoryOutcome {
    /// Documentation was downloaded and parsed
    Documented(DocumentEntry),
    /// The repository has no `api/package.json`
    Undocumented(DocumentEntry),
    /// The download was refused or the package lacks the `main` file
    NoPayload(DocumentEntry),
    /// A lookup, resolution or download failed; nothing is recorded so the
    /// repository is retried on the next refresh
    Failed { name: String, reason: String },
}

impl RepositoryOutcome {
    /// Entry to persist, if any
    pub fn entry(&self) -> Option<&DocumentEntry> {
        match self {
            Self::Documented(entry) | Self::Undocumented(entry) | Self::NoPayload(entry) => {
                Some(entry)
            }
            Self::Failed { .. } => None,
        }
    }

    fn into_entry(self) -> Option<DocumentEntry> {
        match self {
            Self::Documented(entry) | Self::Undocumented(entry) | Self::NoPayload(entry) => {
                Some(entry)
            }
            Self::Failed { .. } => None,
        }
    }
}

/// Counters for one refresh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub scanned: usize,
    pub cached: usize,
    pub documented: usize,
    pub undocumented: usize,
    pub no_payload: usize,
    pub failed: usize,
}

impl RefreshSummary {
    fn record(&mut self, outcome: &RepositoryOutcome) {
        match outcome {
            RepositoryOutcome::Documented(_) => self.documented += 1,
            RepositoryOutcome::Undocumented(_) => self.undocumented += 1,
            RepositoryOutcome::NoPayload(_) => self.no_payload += 1,
            RepositoryOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Coordinates scanner, resolver and fetcher for an organization
#[derive(Clone)]
pub struct Refresher {
    scanner: Arc<dyn RepositoryScanner>,
    resolver: Arc<dyn VersionResolver>,
    fetcher: Arc<dyn ArtifactFetcher>,
    concurrency: usize,
}

impl Refresher {
    pub fn new(
        scanner: Arc<dyn RepositoryScanner>,
        resolver: Arc<dyn VersionResolver>,
        fetcher: Arc<dyn ArtifactFetcher>,
        concurrency: usize,
    ) -> Self {
        Self {
            scanner,
            resolver,
            fetcher,
            concurrency: concurrency.max(1),
        }
    }

    /// Builds the GitHub and npm clients described by `config`
    pub fn from_config(config: &Config) -> Result<Self, RefreshError> {
        let scanner = Arc::new(GitHubScanner::new(config)?);
        let registry = Arc::new(NpmRegistry::new(config)?);
        let resolver = resolver_for(config.version_strategy, registry.clone());

        Ok(Self::new(scanner, resolver, registry, config.concurrency))
    }

    /// Refreshes every repository of `org` and flushes `store` once.
    ///
    /// Returns the documented repositories. Per-repository failures are logged
    /// and never abort the refresh; the store is left untouched when the
    /// listing or the batch itself fails.
    pub async fn refresh(
        &self,
        org: &str,
        store: &mut dyn DocumentStore,
    ) -> Result<DocumentSet, RefreshError> {
        let repos = self.scanner.list_repositories(org).await.inspect_err(|e| {
            error!("Failed to list repositories for {}: {}", org, e);
        })?;

        let mut summary = RefreshSummary {
            scanned: repos.len(),
            ..Default::default()
        };
        let mut docs = DocumentSet::new();
        let mut need_update = Vec::new();

        for repo in &repos {
            match store.get(&repo.name) {
                Some(entry) if entry.is_current(repo) => {
                    info!("Will not fetch {}", repo.name);
                    summary.cached += 1;
                    if entry.has_swagger() {
                        docs.insert(repo.name.clone(), entry);
                    }
                }
                _ => {
                    info!("Will fetch {}", repo.name);
                    need_update.push(repo.clone());
                }
            }
        }

        let outcomes = self.process_all(org, need_update).await.inspect_err(|e| {
            error!("{}", e);
        })?;

        for outcome in outcomes {
            summary.record(&outcome);
            if let Some(entry) = outcome.into_entry() {
                if entry.has_swagger() {
                    docs.insert(entry.name.clone(), entry.clone());
                }
                store.set(entry);
            }
        }

        // Report in listing order regardless of completion order
        let position: HashMap<&str, usize> = repos
            .iter()
            .enumerate()
            .map(|(i, r)| (r.name.as_str(), i))
            .collect();
        docs.sort_by(|a, _, b, _| {
            let pa = position.get(a.as_str()).copied().unwrap_or(usize::MAX);
            let pb = position.get(b.as_str()).copied().unwrap_or(usize::MAX);
            pa.cmp(&pb)
        });

        store.flush()?;

        info!(
            "{} packages read ({} scanned, {} unchanged, {} fetched, {} undocumented, {} without payload, {} failed)",
            docs.len(),
            summary.scanned,
            summary.cached,
            summary.documented,
            summary.undocumented,
            summary.no_payload,
            summary.failed
        );

        Ok(docs)
    }

    /// Runs the chains for `repos` with at most `concurrency` in flight
    async fn process_all(
        &self,
        org: &str,
        repos: Vec<RepositoryRecord>,
    ) -> Result<Vec<RepositoryOutcome>, RefreshError> {
        if repos.is_empty() {
            debug!("All repositories are up to date");
            return Ok(Vec::new());
        }

        let results: Vec<_> = stream::iter(repos)
            .map(|repo| {
                let this = self.clone();
                let org = org.to_string();
                // Spawned only when a slot frees up, so the cap bounds live tasks
                tokio::spawn(async move { this.process_repository(&org, &repo).await })
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        results
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RefreshError::Batch(e.to_string()))
    }

    /// Manifest lookup, version resolution and download for one repository
    pub async fn process_repository(&self, org: &str, repo: &RepositoryRecord) -> RepositoryOutcome {
        let failed = |reason: String| RepositoryOutcome::Failed {
            name: repo.name.clone(),
            reason,
        };

        let manifest = match self.scanner.get_manifest(org, &repo.name).await {
            Ok(Some(manifest)) => manifest,
            Ok(None) => return RepositoryOutcome::Undocumented(DocumentEntry::undocumented(repo)),
            Err(e) => {
                error!("Failed to fetch {}: {}", repo.name, e);
                return failed(e.to_string());
            }
        };

        let version = match self.resolver.resolve_version(&manifest).await {
            Ok(version) => version,
            Err(e) => {
                error!("Failed to resolve version for {}: {}", repo.name, e);
                return failed(e.to_string());
            }
        };

        match self
            .fetcher
            .fetch_documentation(&manifest.name, &version, &manifest.main)
            .await
        {
            Ok(Some(swagger)) => {
                RepositoryOutcome::Documented(DocumentEntry::documented(repo, swagger))
            }
            Ok(None) => {
                warn!(
                    "No documentation at {} in {}@{} for {}",
                    manifest.main, manifest.name, version, repo.name
                );
                RepositoryOutcome::NoPayload(DocumentEntry::undocumented(repo))
            }
            Err(e) => {
                error!(
                    "Failed to fetch documentation for {} from {}@{}: {}",
                    repo.name, manifest.name, version, e
                );
                failed(e.to_string())
            }
        }
    }
}

/// Opens the configured store, refreshes the configured organization and flushes once
pub async fn refresh_org(config: &Config) -> Result<DocumentSet, RefreshError> {
    let refresher = Refresher::from_config(config)?;
    let mut store = JsonStore::open(&config.store_path)?;

    info!("Refreshing package information for {}", config.org);
    refresher.refresh(&config.org, &mut store).await
}
