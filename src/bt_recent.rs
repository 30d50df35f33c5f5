// Recent-search registry
//
// Most-recently-used list of train and station lookups, capped at
// `MAX_RECENT`, unique per (id, kind), persisted under `recentSearches`.

use crate::bt_error::{BTError, Result};
use crate::bt_store::{KeyValueStore, KEY_LEGACY_RECENT_TRAINS, KEY_RECENT_SEARCHES};
use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::{Arc, Mutex};

pub const MAX_RECENT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Train,
    Station,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSearchEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SearchKind,
    #[serde(default)]
    pub timestamp: i64,
}

fn route_label(id: &str, origin: Option<&str>, destination: Option<&str>) -> String {
    format!("{} {} → {}", id, origin.unwrap_or_default(), destination.unwrap_or_default())
        .trim()
        .to_string()
}

impl RecentSearchEntry {
    pub fn train(id: &str, origin: Option<&str>, destination: Option<&str>) -> Self {
        RecentSearchEntry {
            id: id.to_string(),
            name: route_label(id, origin, destination),
            kind: SearchKind::Train,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn station(id: &str, name: &str) -> Self {
        RecentSearchEntry {
            id: id.to_string(),
            name: name.to_string(),
            kind: SearchKind::Station,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    fn same_key(&self, id: &str, kind: SearchKind) -> bool {
        self.id == id && self.kind == kind
    }
}

/// Entry of the old train-only list.
#[derive(Debug, Deserialize)]
struct LegacyTrainEntry {
    #[serde(deserialize_with = "string_or_number")]
    number: String,
    #[serde(default)]
    origin: Option<String>,
    #[serde(default)]
    destination: Option<String>,
    #[serde(default)]
    timestamp: i64,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

pub struct RecentSearchRegistry {
    store: Arc<dyn KeyValueStore>,
    // Serializes read-modify-write cycles on the persisted list
    lock: Mutex<()>,
}

impl RecentSearchRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        RecentSearchRegistry {
            store,
            lock: Mutex::new(()),
        }
    }

    pub fn record(&self, entry: RecentSearchEntry) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut entries = self.load();
        entries.retain(|e| !e.same_key(&entry.id, entry.kind));
        entries.insert(0, entry);
        entries.truncate(MAX_RECENT);
        self.save(&entries)
    }

    pub fn remove(&self, id: &str, kind: SearchKind) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut entries = self.load();
        entries.retain(|e| !e.same_key(id, kind));
        self.save(&entries)
    }

    pub fn list(&self) -> Vec<RecentSearchEntry> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.load()
    }

    fn load(&self) -> Vec<RecentSearchEntry> {
        self.migrate_legacy();

        let Some(raw) = self.store.get(KEY_RECENT_SEARCHES) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Discarding unreadable recent searches: {}", e);
            Vec::new()
        })
    }

    fn save(&self, entries: &[RecentSearchEntry]) -> Result<()> {
        let json = serde_json::to_string(entries)
            .map_err(|e| BTError::FileError(format!("Failed to serialize recent searches: {}", e)))?;
        self.store.set(KEY_RECENT_SEARCHES, &json)
    }

    /// One-time move of the old train-only list into the unified list. Runs
    /// only while the unified list does not exist; the old list is deleted
    /// afterwards, so it never runs twice.
    fn migrate_legacy(&self) {
        if self.store.get(KEY_RECENT_SEARCHES).is_some() {
            return;
        }
        let Some(raw) = self.store.get(KEY_LEGACY_RECENT_TRAINS) else {
            return;
        };

        let legacy: Vec<LegacyTrainEntry> = match serde_json::from_str(&raw) {
            Ok(legacy) => legacy,
            Err(e) => {
                warn!("Cannot migrate legacy recent trains: {}", e);
                return;
            }
        };

        let mut migrated: Vec<RecentSearchEntry> = legacy
            .into_iter()
            .map(|item| RecentSearchEntry {
                name: route_label(&item.number, item.origin.as_deref(), item.destination.as_deref()),
                id: item.number,
                kind: SearchKind::Train,
                timestamp: item.timestamp,
            })
            .collect();
        migrated.truncate(MAX_RECENT);

        let result = self
            .save(&migrated)
            .and_then(|_| self.store.remove(KEY_LEGACY_RECENT_TRAINS));
        match result {
            Ok(()) => info!("Migrated {} legacy recent trains", migrated.len()),
            Err(e) => warn!("Legacy recent trains migration failed: {}", e),
        }
    }
}
