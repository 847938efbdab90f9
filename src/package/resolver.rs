//! Version resolution for documentation packages
//!
//! Two strategies are available:
//! - [`ManifestVersionResolver`]: trust the version written in `api/package.json`
//! - [`LatestVersionResolver`]: ask the registry for the newest published version

use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use tracing::warn;

use crate::config::VersionStrategy;
use crate::error::VersionError;
use crate::package::npm::NpmRegistry;
use crate::source::types::ApiManifest;

/// Chooses which published version of a manifest's package to download
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait VersionResolver: Send + Sync {
    async fn resolve_version(&self, manifest: &ApiManifest) -> Result<String, VersionError>;
}

/// Uses `manifest.version` as-is
pub struct ManifestVersionResolver;

#[async_trait::async_trait]
impl VersionResolver for ManifestVersionResolver {
    async fn resolve_version(&self, manifest: &ApiManifest) -> Result<String, VersionError> {
        let version = manifest.version.trim();
        if version.is_empty() {
            return Err(VersionError::Unavailable {
                package: manifest.name.clone(),
                reason: "manifest has no version".to_string(),
            });
        }
        Ok(version.to_string())
    }
}

/// Uses the highest version published to the registry
pub struct LatestVersionResolver {
    registry: Arc<NpmRegistry>,
}

impl LatestVersionResolver {
    pub fn new(registry: Arc<NpmRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait::async_trait]
impl VersionResolver for LatestVersionResolver {
    async fn resolve_version(&self, manifest: &ApiManifest) -> Result<String, VersionError> {
        let versions = self.registry.fetch_all_versions(&manifest.name).await?;

        let latest = versions
            .last()
            .cloned()
            .ok_or_else(|| VersionError::Unavailable {
                package: manifest.name.clone(),
                reason: "registry lists no versions".to_string(),
            })?;

        if latest != manifest.version {
            warn!(
                "Version mismatch for {}: manifest has {}, registry latest is {}",
                manifest.name, manifest.version, latest
            );
        }

        Ok(latest)
    }
}

/// Builds the resolver for a configured strategy
pub fn resolver_for(
    strategy: VersionStrategy,
    registry: Arc<NpmRegistry>,
) -> Arc<dyn VersionResolver> {
    match strategy {
        VersionStrategy::Manifest => Arc::new(ManifestVersionResolver),
        VersionStrategy::Latest => Arc::new(LatestVersionResolver::new(registry)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use std::time::Duration;

    fn registry(server: &Server) -> Arc<NpmRegistry> {
        Arc::new(
            NpmRegistry::with_base_url(&server.url(), "npm-token", Duration::from_secs(5)).unwrap(),
        )
    }

    #[tokio::test]
    async fn manifest_resolver_returns_manifest_version() {
        let manifest = ApiManifest::new("orders", "1.4.0", "swagger.json");

        let result = ManifestVersionResolver.resolve_version(&manifest).await.unwrap();

        assert_eq!(result, "1.4.0");
    }

    #[tokio::test]
    async fn manifest_resolver_rejects_empty_version() {
        let manifest = ApiManifest::new("orders", " ", "swagger.json");

        let result = ManifestVersionResolver.resolve_version(&manifest).await;

        assert!(matches!(result, Err(VersionError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn latest_resolver_returns_highest_published_version() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/orders")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"versions": {"1.10.0": {}, "1.9.0": {}, "1.4.0": {}}}"#)
            .create_async()
            .await;

        let resolver = LatestVersionResolver::new(registry(&server));
        let manifest = ApiManifest::new("orders", "1.4.0", "swagger.json");

        let result = resolver.resolve_version(&manifest).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, "1.10.0");
    }

    #[tokio::test]
    async fn latest_resolver_fails_when_registry_has_no_versions() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/orders")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"versions": {}}"#)
            .create_async()
            .await;

        let resolver = LatestVersionResolver::new(registry(&server));
        let manifest = ApiManifest::new("orders", "1.4.0", "swagger.json");

        let result = resolver.resolve_version(&manifest).await;

        mock.assert_async().await;
        assert!(matches!(result, Err(VersionError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn latest_resolver_fails_when_registry_errors() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/orders")
            .with_status(500)
            .create_async()
            .await;

        let resolver = LatestVersionResolver::new(registry(&server));
        let manifest = ApiManifest::new("orders", "1.4.0", "swagger.json");

        let result = resolver.resolve_version(&manifest).await;

        mock.assert_async().await;
        assert!(matches!(result, Err(VersionError::Unavailable { .. })));
    }
}
