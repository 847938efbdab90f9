//! Source-control layer: repository listing and manifest lookup
//!
//! # Modules
//!
//! - [`scanner`]: `RepositoryScanner` trait consumed by the refresh orchestrator
//! - [`github`]: GitHub REST API implementation
//! - [`types`]: `RepositoryRecord` and `ApiManifest`

pub mod github;
pub mod scanner;
pub mod types;

pub use github::GitHubScanner;
pub use scanner::RepositoryScanner;
pub use types::{ApiManifest, RepositoryRecord};
