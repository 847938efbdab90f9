//! Package layer: npm registry access, version resolution and tarball extraction
//!
//! # Modules
//!
//! - [`npm`]: Authenticated npm registry client
//! - [`resolver`]: `VersionResolver` trait and its two strategies
//! - [`fetcher`]: `ArtifactFetcher` trait, implemented by the npm client
//! - [`archive`]: Streaming tar.gz extraction of a single JSON entry

pub mod archive;
pub mod fetcher;
pub mod npm;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testing;

pub use fetcher::ArtifactFetcher;
pub use npm::NpmRegistry;
pub use resolver::{LatestVersionResolver, ManifestVersionResolver, VersionResolver, resolver_for};
