//! File-backed durable local storage
//!
//! A flat JSON object of string keys to string values, kept in the user's
//! data directory. The whole file is rewritten on every `set`.

use super::LocalStorage;
use crate::config::APP_ID;
use crate::error::{StorageError, StorageResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// `LocalStorage` persisted to a JSON file
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open the storage file in the default data directory
    pub fn open_default() -> StorageResult<Self> {
        let path = dirs::data_dir()
            .map(|p| p.join(APP_ID).join("local_storage.json"))
            .ok_or(StorageError::DirectoryError)?;
        Self::open(path)
    }

    /// Open (or start) a storage file. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content =
                std::fs::read_to_string(&path).map_err(|source| StorageError::ReadError {
                    path: path.clone(),
                    source,
                })?;
            serde_json::from_str(&content).map_err(|e| StorageError::ParseError(e.to_string()))?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> StorageResult<()> {
        let write_err = |source| StorageError::WriteError {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let content = serde_json::to_string_pretty(values)
            .map_err(|e| StorageError::ParseError(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(write_err)
    }
}

impl LocalStorage for FileStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self
            .values
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut values = self
            .values
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("storage.json");

        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.get("currentTheme").unwrap(), None);
        storage.set("currentTheme", "{\"name\":\"x\"}").unwrap();

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(
            reopened.get("currentTheme").unwrap().as_deref(),
            Some("{\"name\":\"x\"}")
        );
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            FileStorage::open(&path),
            Err(StorageError::ParseError(_))
        ));
    }
}
