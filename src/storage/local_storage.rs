use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use tracing::{debug, error};

use crate::storage::{Storage, StorageError};

/// In-memory key/value store, optionally mirrored to a JSON file on every write.
pub struct LocalStorage {
    cache: DashMap<String, String>,
    path: Option<PathBuf>
}

impl LocalStorage {
    /// Creates a store that lives only as long as the process.
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
            path: None
        }
    }

    /// Opens a file-backed store. A missing file yields an empty store that is created on first write.
    ///
    /// # Errors
    /// Returns `StorageError` if the file exists but cannot be read or is not a JSON object of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let cache = DashMap::new();

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let entries: BTreeMap<String, String> = serde_json::from_str(&contents)?;

            debug!("Loaded {} stored entries from {}", entries.len(), path.display());

            for (key, value) in entries {
                cache.insert(key, value);
            }
        }

        Ok(Self {
            cache,
            path: Some(path)
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    fn persist(&self) {
        let Some(path) = &self.path else {
            return
        };

        let entries: BTreeMap<String, String> = self.cache.iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        if let Err(error) = write_entries(path, &entries) {
            //NOTE: Mirrors browser storage, a failed write keeps the in-memory value and is only reported
            error!("Failed to persist storage to {}: {error}", path.display());
        }
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: &str) {
        self.cache.insert(key.to_string(), value.to_string());
        self.persist();
    }

    fn remove(&self, key: &str) {
        if self.cache.remove(key).is_some() {
            self.persist();
        }
    }
}

fn write_entries(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, serde_json::to_string_pretty(entries)?)?;

    Ok(())
}
