use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::source::types::RepositoryRecord;

/// Last known state of one repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub name: String,
    pub pushed_at: String,
    /// Documentation payload; absent for undocumented repositories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swagger: Option<serde_json::Value>,
}

impl DocumentEntry {
    /// Entry for a repository without a documentation payload
    pub fn undocumented(repo: &RepositoryRecord) -> Self {
        Self {
            name: repo.name.clone(),
            pushed_at: repo.pushed_at.clone(),
            swagger: None,
        }
    }

    /// Entry carrying a freshly fetched payload
    pub fn documented(repo: &RepositoryRecord, swagger: serde_json::Value) -> Self {
        Self {
            name: repo.name.clone(),
            pushed_at: repo.pushed_at.clone(),
            swagger: Some(swagger),
        }
    }

    pub fn has_swagger(&self) -> bool {
        self.swagger.is_some()
    }

    /// True when the entry was recorded for the same push as `repo`
    pub fn is_current(&self, repo: &RepositoryRecord) -> bool {
        self.pushed_at == repo.pushed_at
    }
}

/// Documented repositories keyed by name, in discovery order
pub type DocumentSet = IndexMap<String, DocumentEntry>;
