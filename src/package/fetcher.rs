//! Artifact fetcher: downloads a package and extracts its documentation

#[cfg(test)]
use mockall::automock;

use crate::error::FetchError;
use crate::package::archive::{entry_path, extract_from_response};
use crate::package::npm::NpmRegistry;

/// Downloads a published package and returns its documentation payload
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Fetches `package_name@version` and parses the file at `main` inside it
    ///
    /// # Returns
    /// * `Ok(Some(json))` - The documentation file was found and parsed
    /// * `Ok(None)` - The download was refused or the file is not in the package
    /// * `Err(FetchError)` - Transport, archive or JSON failure
    async fn fetch_documentation(
        &self,
        package_name: &str,
        version: &str,
        main: &str,
    ) -> Result<Option<serde_json::Value>, FetchError>;
}

#[async_trait::async_trait]
impl ArtifactFetcher for NpmRegistry {
    async fn fetch_documentation(
        &self,
        package_name: &str,
        version: &str,
        main: &str,
    ) -> Result<Option<serde_json::Value>, FetchError> {
        let Some(response) = self.download(package_name, version).await? else {
            return Ok(None);
        };

        extract_from_response(response, entry_path(main)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::testing::tarball;
    use mockito::Server;
    use serde_json::json;
    use std::io::Write;
    use std::time::Duration;

    fn registry(server: &Server) -> NpmRegistry {
        NpmRegistry::with_base_url(&server.url(), "npm-token", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn fetch_documentation_extracts_main_file_from_scoped_package() {
        let mut server = Server::new_async().await;
        let body = tarball(&[
            ("package/README.md", "# Orders"),
            ("package/api/swagger.json", r#"{"swagger": "2.0", "info": {"title": "A"}}"#),
            ("package/package.json", r#"{"name": "@acme/orders"}"#),
        ]);

        let mock = server
            .mock("GET", "/@acme/orders/-/orders-1.2.3.tgz")
            .match_header("authorization", "Bearer npm-token")
            .with_status(200)
            .with_header("content-type", "application/octet-stream")
            .with_body(body)
            .create_async()
            .await;

        let result = registry(&server)
            .fetch_documentation("@acme/orders", "1.2.3", "api/swagger.json")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            result,
            Some(json!({"swagger": "2.0", "info": {"title": "A"}}))
        );
    }

    #[tokio::test]
    async fn fetch_documentation_returns_none_for_forbidden_download() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/orders/-/orders-1.0.0.tgz")
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;

        let result = registry(&server)
            .fetch_documentation("orders", "1.0.0", "swagger.json")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn fetch_documentation_returns_none_when_main_is_missing() {
        let mut server = Server::new_async().await;
        let body = tarball(&[("package/index.js", "module.exports = {};")]);

        let mock = server
            .mock("GET", "/orders/-/orders-1.0.0.tgz")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let result = registry(&server)
            .fetch_documentation("orders", "1.0.0", "swagger.json")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn fetch_documentation_fails_on_corrupt_archive() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/orders/-/orders-1.0.0.tgz")
            .with_status(200)
            .with_body("<html>not a tarball</html>")
            .create_async()
            .await;

        let result = registry(&server)
            .fetch_documentation("orders", "1.0.0", "swagger.json")
            .await;

        mock.assert_async().await;
        assert!(matches!(result, Err(FetchError::Archive(_))));
    }

    #[tokio::test]
    async fn fetch_documentation_fails_when_download_stalls() {
        let mut server = Server::new_async().await;
        let body = tarball(&[("package/swagger.json", r#"{"title": "A"}"#)]);

        let _mock = server
            .mock("GET", "/orders/-/orders-1.0.0.tgz")
            .with_status(200)
            .with_chunked_body(move |w| {
                std::thread::sleep(Duration::from_secs(2));
                w.write_all(&body)
            })
            .create_async()
            .await;

        let registry =
            NpmRegistry::with_base_url(&server.url(), "npm-token", Duration::from_millis(200))
                .unwrap();
        let result = registry
            .fetch_documentation("orders", "1.0.0", "swagger.json")
            .await;

        assert!(matches!(result, Err(FetchError::Network(_))));
    }
}
