use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unauthorized: GitHub returned status {status}")]
    Unauthorized { status: u16 },

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("No version available for {package}: {reason}")]
    Unavailable { package: String, reason: String },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] std::io::Error),

    #[error("Invalid documentation JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive decoder failed: {0}")]
    Worker(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Failed to list repositories: {0}")]
    Listing(#[from] ScanError),

    #[error("Cache store error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to fetch APIs: {0}")]
    Batch(String),
}
