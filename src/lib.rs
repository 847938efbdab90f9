//! Discovers the swagger documents published by a GitHub organization's repositories.
//!
//! Repositories that carry an `api/package.json` name an npm package; the
//! package's `main` file is downloaded from the registry and cached per
//! repository, keyed by the repository's last push.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Source    │────▶│   Refresh   │◀───▶│    Store    │
//! │  (GitHub)   │     │(orchestrate)│     │ (JSON file) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                            ▼
//!                     ┌─────────────┐
//!                     │   Package   │
//!                     │(npm, tar.gz)│
//!                     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`config`]: Explicit configuration and environment loading
//! - [`error`]: Error types for every layer
//! - [`logging`]: Tracing subscriber setup
//! - [`package`]: npm registry client, version resolution, tarball extraction
//! - [`query`]: Name search and document lookup over the answer set
//! - [`refresh`]: Bounded-concurrency refresh orchestrator
//! - [`source`]: Repository listing and manifest lookup
//! - [`store`]: Durable per-repository cache

pub mod config;
pub mod error;
pub mod logging;
pub mod package;
pub mod query;
pub mod refresh;
pub mod source;
pub mod store;
