use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};

use super::loader::load_table;
use super::table::Table;

/// The two tables the dashboard works on, sharing one identifier space.
#[derive(Debug, Clone, PartialEq)]
pub struct Datasets {
    /// Descriptive client attributes (gender, income, children, ...).
    pub clients: Table,
    /// Model features, plus one trailing column that is never scored.
    pub features: Table,
}

/// Loads the client table and the feature sample once per store.
///
/// The store is built once at startup and handed to whoever needs the data;
/// every successful [`load`](Self::load) after the first returns the same
/// `Arc`. A failed load is not cached, so the next call reads storage again.
#[derive(Debug)]
pub struct DatasetStore {
    clients_path: PathBuf,
    features_path: PathBuf,
    id_column: String,
    cache: OnceLock<Arc<Datasets>>,
}

impl DatasetStore {
    pub fn new(
        clients_path: impl Into<PathBuf>,
        features_path: impl Into<PathBuf>,
        id_column: impl Into<String>,
    ) -> Self {
        DatasetStore {
            clients_path: clients_path.into(),
            features_path: features_path.into(),
            id_column: id_column.into(),
            cache: OnceLock::new(),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(
            &config.clients_path,
            &config.features_path,
            &config.id_column,
        )
    }

    pub fn load(&self) -> Result<Arc<Datasets>> {
        if let Some(cached) = self.cache.get() {
            log::debug!("Datasets served from cache");
            return Ok(Arc::clone(cached));
        }

        let clients = load_table(&self.clients_path, &self.id_column)?;
        let features = load_table(&self.features_path, &self.id_column)?;
        if features.columns().is_empty() {
            return Err(DashboardError::schema(format!(
                "{} has no columns besides {}",
                self.features_path.display(),
                self.id_column
            )));
        }

        // Concurrent first loads race here; every caller gets the winner.
        let _ = self.cache.set(Arc::new(Datasets { clients, features }));
        self.cache
            .get()
            .cloned()
            .ok_or_else(|| DashboardError::schema("dataset cache left empty after load"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn store(dir: &tempfile::TempDir) -> DatasetStore {
        let clients = write(dir, "clients.csv", "SK_ID_CURR,CNT_CHILDREN\n100,0\n200,2\n");
        let features = write(dir, "sample.csv", "SK_ID_CURR,f0,f1,TARGET\n100,0.1,3,0\n200,0.7,1,0\n");
        DatasetStore::new(clients, features, "SK_ID_CURR")
    }

    #[test]
    fn second_load_returns_cached_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let first = store.load().unwrap();
        let second = store.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.features.columns(), ["f0", "f1", "TARGET"]);
    }

    #[test]
    fn separate_stores_load_identical_content() {
        let dir = tempfile::tempdir().unwrap();
        let a = store(&dir).load().unwrap();
        let b = store(&dir).load().unwrap();
        assert_eq!(*a, *b);
    }

    #[test]
    fn cache_survives_file_removal() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let first = store.load().unwrap();

        std::fs::remove_file(dir.path().join("clients.csv")).unwrap();
        assert!(Arc::ptr_eq(&first, &store.load().unwrap()));
    }

    #[test]
    fn missing_source_is_an_io_error_and_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let features = write(&dir, "sample.csv", "SK_ID_CURR,f0,TARGET\n100,0.1,0\n");
        let clients = dir.path().join("clients.csv");
        let store = DatasetStore::new(&clients, features, "SK_ID_CURR");

        assert!(matches!(store.load(), Err(DashboardError::Io { .. })));

        std::fs::write(&clients, "SK_ID_CURR,CNT_CHILDREN\n100,0\n").unwrap();
        assert_eq!(store.load().unwrap().clients.len(), 1);
    }

    #[test]
    fn missing_id_column_is_a_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let clients = write(&dir, "clients.csv", "ID,CNT_CHILDREN\n100,0\n");
        let features = write(&dir, "sample.csv", "SK_ID_CURR,f0,TARGET\n100,0.1,0\n");
        let store = DatasetStore::new(clients, features, "SK_ID_CURR");
        assert!(matches!(store.load(), Err(DashboardError::Schema(_))));
    }
}
