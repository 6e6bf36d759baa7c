//! Cache store for merged options and tokens
//!
//! Keys are `:`-delimited (`cache:theme:options.json`). [`FileStore`] maps
//! each segment to a directory level, so the key above lives at
//! `<root>/cache/theme/options.json`.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid store key '{0}'")]
    InvalidKey(String),
}

/// Key/value store the orchestrator and endpoint handlers share.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError>;

    /// Every stored key, sorted.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), value.clone());
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.lock().keys().cloned().collect())
    }
}

/// Directory-backed store, one JSON file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let mut path = self.root.clone();
        for segment in key.split(':') {
            let valid = !segment.is_empty()
                && segment != "."
                && segment != ".."
                && !segment.contains(['/', '\\'])
                && !segment.ends_with(".tmp");
            if !valid {
                return Err(StoreError::InvalidKey(key.to_string()));
            }
            path.push(segment);
        }
        Ok(path)
    }
}

impl CacheStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write atomically (write-then-rename)
    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(value)?;
        let mut temp_name = path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!(key, path = %path.display(), "stored cache entry");
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1) {
            let entry = entry.map_err(|e| StoreError::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            if relative.extension().is_some_and(|ext| ext == "tmp") {
                continue;
            }
            let segments: Vec<_> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            keys.push(segments.join(":"));
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use theme_protocol::{OPTIONS_CACHE_KEY, TOKENS_CACHE_KEY};

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get(OPTIONS_CACHE_KEY).unwrap(), None);

        store.set(OPTIONS_CACHE_KEY, &json!({"a": 1})).unwrap();
        assert_eq!(store.get(OPTIONS_CACHE_KEY).unwrap(), Some(json!({"a": 1})));
        assert_eq!(store.keys().unwrap(), vec![OPTIONS_CACHE_KEY]);
    }

    #[test]
    fn test_file_store_layout() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        store.set(OPTIONS_CACHE_KEY, &json!({"title": "Docs"})).unwrap();

        let path = dir.path().join("cache").join("theme").join("options.json");
        assert!(path.exists());
        assert_eq!(store.get(OPTIONS_CACHE_KEY).unwrap(), Some(json!({"title": "Docs"})));
    }

    #[test]
    fn test_file_store_overwrite_and_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("store"));
        assert!(store.keys().unwrap().is_empty());

        store.set(TOKENS_CACHE_KEY, &json!({})).unwrap();
        store.set(OPTIONS_CACHE_KEY, &json!(1)).unwrap();
        store.set(OPTIONS_CACHE_KEY, &json!(2)).unwrap();

        assert_eq!(store.get(OPTIONS_CACHE_KEY).unwrap(), Some(json!(2)));
        assert_eq!(store.keys().unwrap(), vec![OPTIONS_CACHE_KEY, TOKENS_CACHE_KEY]);
    }

    #[test]
    fn test_file_store_missing_key() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get("cache:theme:absent.json").unwrap(), None);
    }

    #[test]
    fn test_invalid_keys() {
        let store = FileStore::new("/tmp/store");
        assert!(matches!(store.path_for("cache::x"), Err(StoreError::InvalidKey(_))));
        assert!(matches!(store.path_for("cache:..:x"), Err(StoreError::InvalidKey(_))));
        assert!(matches!(store.path_for("cache:a/b"), Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn test_corrupt_entry_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let path = store.path_for(OPTIONS_CACHE_KEY).unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ nope").unwrap();

        assert!(matches!(store.get(OPTIONS_CACHE_KEY), Err(StoreError::Json(_))));
    }
}
