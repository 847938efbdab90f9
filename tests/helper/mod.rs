pub mod fixtures;
pub mod github;

#[allow(unused_imports)]
pub use fixtures::{tarball, test_config};
#[allow(unused_imports)]
pub use github::{mock_listing, mock_manifest, mock_missing_manifest};
