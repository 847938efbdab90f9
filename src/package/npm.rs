//! npm registry client: version listing and tarball download

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Response;
use semver::Version;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::{Config, USER_AGENT};
use crate::error::{FetchError, VersionError};

/// Packument returned by `GET /{package}`
#[derive(Debug, Deserialize)]
struct NpmPackageResponse {
    #[serde(default)]
    versions: HashMap<String, serde_json::Value>,
}

/// Authenticated npm registry client shared by version resolution and downloads
pub struct NpmRegistry {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl NpmRegistry {
    /// Creates a registry client from the npm settings in `config`
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Self::with_base_url(
            &config.npm_registry_url,
            &config.npm_token,
            config.request_timeout,
        )
    }

    /// Creates a registry client against a custom base URL.
    ///
    /// `timeout` bounds connecting and each individual read, not the whole
    /// request, so large tarballs can stream while a stalled one fails.
    pub fn with_base_url(
        base_url: &str,
        token: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Encode package name for URL (handles scoped packages)
    fn encode_package_name(package_name: &str) -> String {
        if package_name.starts_with('@') {
            // Scoped package: @scope/name -> @scope%2Fname
            package_name.replace('/', "%2F")
        } else {
            package_name.to_string()
        }
    }

    /// Download URL of a published tarball
    pub fn archive_url(&self, package_name: &str, version: &str) -> String {
        format!(
            "{}/{}/-/{}",
            self.base_url,
            package_name,
            archive_file_name(package_name, version)
        )
    }

    /// Fetches every published version, sorted by semver (lowest first, highest last).
    ///
    /// Keys that are not valid semver are dropped.
    pub async fn fetch_all_versions(&self, package_name: &str) -> Result<Vec<String>, VersionError> {
        let unavailable = |reason: String| VersionError::Unavailable {
            package: package_name.to_string(),
            reason,
        };

        let url = format!("{}/{}", self.base_url, Self::encode_package_name(package_name));

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("npm registry returned status {}: {}", status, url);
            return Err(unavailable(format!("registry returned status {}", status)));
        }

        let package_info: NpmPackageResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse npm registry response: {}", e);
            unavailable(e.to_string())
        })?;

        let mut versions: Vec<(String, Version)> = package_info
            .versions
            .into_keys()
            .filter_map(|v| Version::parse(&v).ok().map(|parsed| (v, parsed)))
            .collect();

        versions.sort_by(|(_, a), (_, b)| a.cmp(b));

        Ok(versions.into_iter().map(|(v, _)| v).collect())
    }

    /// Starts downloading a tarball.
    ///
    /// Returns `Ok(None)` when the registry answers with a non-success status.
    /// The response is dropped in that case, which aborts the transfer.
    pub async fn download(
        &self,
        package_name: &str,
        version: &str,
    ) -> Result<Option<Response>, FetchError> {
        info!("Fetching {}@{}", package_name, version);

        let url = self.archive_url(package_name, version);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(
                "Unable to fetch npm package for {}@{} (status {})",
                package_name,
                version,
                response.status()
            );
            drop(response);
            return Ok(None);
        }

        Ok(Some(response))
    }
}

/// Tarball file name; scoped packages use only the part after the slash
pub fn archive_file_name(package_name: &str, version: &str) -> String {
    let base = match package_name.split_once('/') {
        Some((_scope, name)) if !name.is_empty() => name,
        _ => package_name,
    };
    format!("{}-{}.tgz", base, version)
}
