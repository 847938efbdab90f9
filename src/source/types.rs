//! Records read from source control

use serde::{Deserialize, Serialize};

/// One repository from the organization listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub name: String,
    /// Timestamp of the last push, kept verbatim as GitHub reports it
    pub pushed_at: String,
}

impl RepositoryRecord {
    pub fn new(name: impl Into<String>, pushed_at: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pushed_at: pushed_at.into(),
        }
    }
}

/// Contents of a repository's `api/package.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiManifest {
    /// Published npm package holding the documentation
    pub name: String,
    #[serde(default)]
    pub version: String,
    /// Path of the documentation JSON inside the package
    #[serde(default = "default_main")]
    pub main: String,
}

fn default_main() -> String {
    "index.js".to_string()
}

impl ApiManifest {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        main: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            main: main.into(),
        }
    }
}
