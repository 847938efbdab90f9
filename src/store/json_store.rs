use std::path::{Path, PathBuf};

use indexmap::IndexMap;
#[cfg(test)]
use mockall::automock;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::types::{DocumentEntry, DocumentSet};

/// Key-value storage of repository state, written back explicitly
#[cfg_attr(test, automock)]
pub trait DocumentStore: Send {
    /// Get the entry recorded for a repository
    fn get(&self, name: &str) -> Option<DocumentEntry>;

    /// Check whether a repository has been recorded
    fn has(&self, name: &str) -> bool;

    /// Insert or replace the entry for `entry.name`
    fn set(&mut self, entry: DocumentEntry);

    /// Write all entries to durable storage
    fn flush(&mut self) -> Result<(), StoreError>;
}

/// Store persisted as one JSON object keyed by repository name
pub struct JsonStore {
    path: PathBuf,
    entries: IndexMap<String, DocumentEntry>,
}

impl JsonStore {
    /// Opens the store at `path`; a missing file yields an empty store
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let entries = match std::fs::read(path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => IndexMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No cache store at {:?}, starting empty", path);
                IndexMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        debug!("Opened cache store at {:?} with {} entries", path, entries.len());

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of every recorded repository, documented or not
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries that carry a documentation payload
    pub fn documents(&self) -> DocumentSet {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.has_swagger())
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect()
    }
}

impl DocumentStore for JsonStore {
    fn get(&self, name: &str) -> Option<DocumentEntry> {
        self.entries.get(name).cloned()
    }

    fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    fn set(&mut self, entry: DocumentEntry) {
        self.entries.insert(entry.name.clone(), entry);
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(&self.entries)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        // Replace the previous file in one rename so readers never see a partial write
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!("Wrote {} entries to {:?}", self.entries.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::types::RepositoryRecord;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, JsonStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonStore::open(&temp_dir.path().join("db.json")).unwrap();
        (temp_dir, store)
    }

    #[test]
    fn open_returns_empty_store_for_missing_file() {
        let (_temp_dir, store) = create_test_store();

        assert!(store.is_empty());
        assert!(!store.has("orders"));
    }

    #[test]
    fn open_rejects_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.json");
        std::fs::write(&path, "{ broken").unwrap();

        let result = JsonStore::open(&path);

        assert!(matches!(result, Err(StoreError::Json(_))));
    }

    #[test]
    fn set_replaces_existing_entry() {
        let (_temp_dir, mut store) = create_test_store();

        store.set(DocumentEntry::undocumented(&RepositoryRecord::new("orders", "t1")));
        store.set(DocumentEntry::documented(
            &RepositoryRecord::new("orders", "t2"),
            json!({"title": "Orders"}),
        ));

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get("orders"),
            Some(DocumentEntry {
                name: "orders".to_string(),
                pushed_at: "t2".to_string(),
                swagger: Some(json!({"title": "Orders"})),
            })
        );
    }

    #[test]
    fn flush_then_open_round_trips_entries() {
        let (temp_dir, mut store) = create_test_store();
        let swagger = json!({
            "swagger": "2.0",
            "info": {"title": "Orders", "version": "1.0.0"},
            "paths": {"/orders": {"get": {"responses": {"200": {"description": "ok"}}}}}
        });
        store.set(DocumentEntry::documented(
            &RepositoryRecord::new("orders", "2024-01-15T10:20:30Z"),
            swagger.clone(),
        ));
        store.set(DocumentEntry::undocumented(&RepositoryRecord::new(
            "website",
            "2024-02-01T00:00:00Z",
        )));
        store.flush().unwrap();

        let reopened = JsonStore::open(&temp_dir.path().join("db.json")).unwrap();

        let orders = reopened.get("orders").unwrap();
        assert_eq!(orders.pushed_at, "2024-01-15T10:20:30Z");
        assert_eq!(
            serde_json::to_string(&orders.swagger).unwrap(),
            serde_json::to_string(&Some(swagger)).unwrap()
        );
        assert_eq!(reopened.get("website").unwrap().swagger, None);
        assert_eq!(reopened.names().collect::<Vec<_>>(), vec!["orders", "website"]);
    }

    #[test]
    fn flush_creates_missing_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/cache/db.json");
        let mut store = JsonStore::open(&path).unwrap();
        store.set(DocumentEntry::undocumented(&RepositoryRecord::new("a", "t1")));

        store.flush().unwrap();

        assert!(path.exists());
    }

    #[test]
    fn documents_skips_entries_without_swagger() {
        let (_temp_dir, mut store) = create_test_store();
        store.set(DocumentEntry::undocumented(&RepositoryRecord::new("website", "t2")));
        store.set(DocumentEntry::documented(
            &RepositoryRecord::new("orders", "t1"),
            json!({"title": "A"}),
        ));

        let documents = store.documents();

        assert_eq!(documents.keys().collect::<Vec<_>>(), vec!["orders"]);
    }
}
