// Persisted client state
//
// A flat string key-value store, like browser local storage: every key is
// independent, may be missing, and may be wiped from outside at any time.

use crate::bt_error::{BTError, Result};
use log::warn;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const KEY_LANGUAGE: &str = "language";
pub const KEY_THEME: &str = "theme";
pub const KEY_RECENT_SEARCHES: &str = "recentSearches";
pub const KEY_LEGACY_RECENT_TRAINS: &str = "recentTrains";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

// ============================================================================
// File-backed store
// ============================================================================

/// JSON object on disk. The file is re-read on every access so that external
/// edits or deletion are picked up.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub const FILE_NAME: &'static str = "state.json";

    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .map_err(|e| BTError::FileError(format!("Failed to create state directory {:?}: {}", dir, e)))?;
        Ok(FileStore {
            path: dir.join(Self::FILE_NAME),
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> HashMap<String, String> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(_) => return HashMap::new(),
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!("Ignoring unreadable state file {:?}: {}", self.path, e);
            HashMap::new()
        })
    }

    fn write_all(&self, map: &HashMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(map)
            .map_err(|e| BTError::FileError(format!("Failed to serialize state: {}", e)))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| BTError::FileError(format!("Failed to write state: {}", e)))?;
        fs::rename(&tmp, &self.path).map_err(|e| BTError::FileError(format!("Failed to replace state: {}", e)))
    }

    fn update(&self, f: impl FnOnce(&mut HashMap<String, String>)) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut map = self.read_all();
        f(&mut map);
        self.write_all(&map)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.read_all().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|map| {
            map.remove(key);
        })
    }
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.map
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.map
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert_eq!(store.get(KEY_THEME), None);
        store.set(KEY_THEME, "dark").unwrap();
        store.set(KEY_LANGUAGE, "it").unwrap();
        assert_eq!(store.get(KEY_THEME).as_deref(), Some("dark"));

        store.remove(KEY_THEME).unwrap();
        assert_eq!(store.get(KEY_THEME), None);
        assert_eq!(store.get(KEY_LANGUAGE).as_deref(), Some("it"));
    }

    #[test]
    fn file_store_tolerates_external_wipe_and_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set(KEY_LANGUAGE, "zh").unwrap();

        fs::remove_file(store.path()).unwrap();
        assert_eq!(store.get(KEY_LANGUAGE), None);

        fs::write(store.path(), "not json").unwrap();
        assert_eq!(store.get(KEY_LANGUAGE), None);
        store.set(KEY_LANGUAGE, "en").unwrap();
        assert_eq!(store.get(KEY_LANGUAGE).as_deref(), Some("en"));
    }

    #[test]
    fn memory_store() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k"), None);
    }
}
