use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ConfigError;

// =============================================================================
// Service endpoints
// =============================================================================

/// Default base URL for the GitHub REST API
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Default base URL for the npm registry
pub const DEFAULT_NPM_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// User agent sent to GitHub and npm (GitHub rejects requests without one)
pub const USER_AGENT: &str = "swagger-browser";

/// Path of the manifest that marks a repository as documented
pub const MANIFEST_PATH: &str = "api/package.json";

// =============================================================================
// Time-related constants
// =============================================================================

/// Timeout for each GitHub and npm request in milliseconds (5 seconds)
pub const REQUEST_TIMEOUT_MS: u64 = 5_000;

/// Default interval between refreshes in `watch` mode (10 minutes)
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 10 * 60 * 1000;

// =============================================================================
// Refresh defaults
// =============================================================================

/// Maximum number of manifest/fetch chains in flight at once
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Number of repositories requested from the single listing page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default location of the JSON cache store
pub const DEFAULT_STORE_PATH: &str = "db.json";

static NPMRC_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"//registry\.npmjs\.(?:com|org)/:_authToken=(.*)").expect("valid npmrc pattern")
});

/// How the version of a documentation package is chosen
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VersionStrategy {
    /// Use the version written in `api/package.json`
    #[default]
    Manifest,
    /// Use the newest version published to the registry
    Latest,
}

impl FromStr for VersionStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manifest" => Ok(Self::Manifest),
            "latest" => Ok(Self::Latest),
            other => Err(ConfigError::Invalid {
                key: "SWAGGER_VERSION_STRATEGY",
                reason: format!("expected \"manifest\" or \"latest\", got {:?}", other),
            }),
        }
    }
}

/// Everything a refresh needs, passed explicitly to the clients it builds
#[derive(Clone, PartialEq)]
pub struct Config {
    pub org: String,
    pub github_token: String,
    pub npm_token: String,
    pub github_api_url: String,
    pub npm_registry_url: String,
    pub store_path: PathBuf,
    pub concurrency: usize,
    pub request_timeout: Duration,
    pub page_size: u32,
    pub version_strategy: VersionStrategy,
    pub refresh_interval: Duration,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Creates a configuration with default endpoints and limits
    pub fn new(
        org: impl Into<String>,
        github_token: impl Into<String>,
        npm_token: impl Into<String>,
    ) -> Self {
        Self {
            org: org.into(),
            github_token: github_token.into(),
            npm_token: npm_token.into(),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            npm_registry_url: DEFAULT_NPM_REGISTRY_URL.to_string(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout: Duration::from_millis(REQUEST_TIMEOUT_MS),
            page_size: DEFAULT_PAGE_SIZE,
            version_strategy: VersionStrategy::default(),
            refresh_interval: Duration::from_millis(DEFAULT_REFRESH_INTERVAL_MS),
            log_file: None,
        }
    }

    /// Loads configuration from `.env` and the process environment.
    ///
    /// Values in `.env` override the environment. When `NPM_TOKEN` is unset
    /// the token is read from `~/.npmrc`.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv_override() {
            Ok(path) => debug!("Loaded environment overlay from {:?}", path),
            Err(e) if e.not_found() => debug!("No .env file found"),
            Err(e) => warn!("Ignoring unreadable .env file: {}", e),
        }

        Self::from_lookup(|key| std::env::var(key).ok(), dirs::home_dir())
    }

    fn from_lookup<F>(lookup: F, home_dir: Option<PathBuf>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let org = var("GITHUB_ORG").ok_or(ConfigError::Missing("GITHUB_ORG"))?;
        let github_token = var("GITHUB_TOKEN").ok_or(ConfigError::Missing("GITHUB_TOKEN"))?;
        let npm_token = var("NPM_TOKEN")
            .or_else(|| home_dir.as_deref().and_then(detect_npm_token))
            .ok_or(ConfigError::Missing("NPM_TOKEN"))?;

        let mut config = Self::new(org, github_token, npm_token);

        if let Some(url) = var("GITHUB_API_URL") {
            config.github_api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = var("NPM_REGISTRY_URL") {
            config.npm_registry_url = url.trim_end_matches('/').to_string();
        }
        if let Some(path) = var("SWAGGER_DB") {
            config.store_path = PathBuf::from(path);
        }
        if let Some(concurrency) = var("SWAGGER_CONCURRENCY") {
            config.concurrency = parse_concurrency(&concurrency)?;
        }
        if let Some(strategy) = var("SWAGGER_VERSION_STRATEGY") {
            config.version_strategy = strategy.parse()?;
        }
        config.log_file = var("SWAGGER_LOG_FILE").map(PathBuf::from);

        Ok(config)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("org", &self.org)
            .field("github_token", &"<redacted>")
            .field("npm_token", &"<redacted>")
            .field("github_api_url", &self.github_api_url)
            .field("npm_registry_url", &self.npm_registry_url)
            .field("store_path", &self.store_path)
            .field("concurrency", &self.concurrency)
            .field("request_timeout", &self.request_timeout)
            .field("page_size", &self.page_size)
            .field("version_strategy", &self.version_strategy)
            .field("refresh_interval", &self.refresh_interval)
            .field("log_file", &self.log_file)
            .finish()
    }
}

fn parse_concurrency(value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err(ConfigError::Invalid {
            key: "SWAGGER_CONCURRENCY",
            reason: "must be at least 1".to_string(),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::Invalid {
            key: "SWAGGER_CONCURRENCY",
            reason: e.to_string(),
        }),
    }
}

/// Reads the npm auth token from `<home>/.npmrc`, if one was saved by `npm login`
pub fn detect_npm_token(home_dir: &Path) -> Option<String> {
    let npmrc = home_dir.join(".npmrc");
    match std::fs::read_to_string(&npmrc) {
        Ok(contents) => {
            let token = parse_npmrc_token(&contents);
            if token.is_none() {
                warn!("No registry token in {:?}; run 'npm login' to access private packages", npmrc);
            }
            token
        }
        Err(e) => {
            debug!("Could not read {:?}: {}", npmrc, e);
            None
        }
    }
}

fn parse_npmrc_token(contents: &str) -> Option<String> {
    NPMRC_TOKEN_RE
        .captures(contents)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|token| !token.is_empty())
}
