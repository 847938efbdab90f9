//! GitHub REST API repository scanner

use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::{Config, MANIFEST_PATH, USER_AGENT};
use crate::error::ScanError;
use crate::source::scanner::RepositoryScanner;
use crate::source::types::{ApiManifest, RepositoryRecord};

/// Repository as returned by `GET /orgs/{org}/repos`
#[derive(Debug, Deserialize)]
struct RepoResponse {
    name: String,
    /// Null for repositories that were never pushed to
    pushed_at: Option<String>,
}

/// Scanner backed by an authenticated GitHub API client
pub struct GitHubScanner {
    client: reqwest::Client,
    base_url: String,
    token: String,
    page_size: u32,
}

impl GitHubScanner {
    /// Creates a scanner from the GitHub settings in `config`
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Self::with_base_url(
            &config.github_api_url,
            &config.github_token,
            config.page_size,
            config.request_timeout,
        )
    }

    /// Creates a scanner against a custom API base URL
    pub fn with_base_url(
        base_url: &str,
        token: &str,
        page_size: u32,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            page_size,
        })
    }

    async fn get(&self, url: &str) -> Result<Response, ScanError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        Ok(response)
    }
}

/// Maps a non-success GitHub status to the matching error
fn status_error(response: &Response, url: &str) -> ScanError {
    let status = response.status();
    let header_value = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => ScanError::RateLimited {
            retry_after_secs: header_value("retry-after"),
        },
        // GitHub reports an exhausted primary rate limit as 403
        StatusCode::FORBIDDEN if header_value("x-ratelimit-remaining") == Some(0) => {
            ScanError::RateLimited {
                retry_after_secs: header_value("retry-after"),
            }
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ScanError::Unauthorized {
            status: status.as_u16(),
        },
        _ => {
            warn!("GitHub API returned status {}: {}", status, url);
            ScanError::InvalidResponse(format!("Unexpected status: {}", status))
        }
    }
}

#[async_trait::async_trait]
impl RepositoryScanner for GitHubScanner {
    async fn list_repositories(&self, org: &str) -> Result<Vec<RepositoryRecord>, ScanError> {
        // Only the first page is read
        let url = format!(
            "{}/orgs/{}/repos?per_page={}",
            self.base_url, org, self.page_size
        );

        let response = self.get(&url).await?;
        if !response.status().is_success() {
            return Err(status_error(&response, &url));
        }

        let repos: Vec<RepoResponse> = response.json().await.map_err(|e| {
            warn!("Failed to parse repository listing for {}: {}", org, e);
            ScanError::InvalidResponse(e.to_string())
        })?;

        debug!("Listed {} repositories for {}", repos.len(), org);

        Ok(repos
            .into_iter()
            .map(|r| RepositoryRecord::new(r.name, r.pushed_at.unwrap_or_default()))
            .collect())
    }

    async fn get_manifest(&self, org: &str, repo: &str) -> Result<Option<ApiManifest>, ScanError> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_url, org, repo, MANIFEST_PATH
        );

        let response = self.get(&url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            info!("{} does not have {}", repo, MANIFEST_PATH);
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(&response, &url));
        }

        let content: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ScanError::InvalidResponse(e.to_string()))?;

        // Directories come back as arrays and have no download_url
        let Some(download_url) = content.get("download_url").and_then(|v| v.as_str()) else {
            info!("{} does not have {}", repo, MANIFEST_PATH);
            return Ok(None);
        };

        let response = self.get(download_url).await?;
        if !response.status().is_success() {
            return Err(status_error(&response, download_url));
        }

        let text = response.text().await?;
        let manifest: ApiManifest = serde_json::from_str(&text).map_err(|e| {
            warn!("Invalid {} in {}: {}", MANIFEST_PATH, repo, e);
            ScanError::InvalidResponse(e.to_string())
        })?;

        Ok(Some(manifest))
    }
}
