//! Repository scanner trait

#[cfg(test)]
use mockall::automock;

use crate::error::ScanError;
use crate::source::types::{ApiManifest, RepositoryRecord};

/// Lists an organization's repositories and reads their API manifests
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait RepositoryScanner: Send + Sync {
    /// Lists one page of repositories for the organization
    async fn list_repositories(&self, org: &str) -> Result<Vec<RepositoryRecord>, ScanError>;

    /// Reads `api/package.json` from a repository
    ///
    /// # Returns
    /// * `Ok(Some(manifest))` - The repository documents an API
    /// * `Ok(None)` - The manifest does not exist
    /// * `Err(ScanError)` - Any other failure (auth, network, malformed content)
    async fn get_manifest(&self, org: &str, repo: &str) -> Result<Option<ApiManifest>, ScanError>;
}
