use bellotreno::bt_recent::{RecentSearchEntry, RecentSearchRegistry, SearchKind};
use bellotreno::bt_store::{FileStore, KeyValueStore, KEY_LEGACY_RECENT_TRAINS, KEY_RECENT_SEARCHES};
use std::sync::Arc;

#[test]
fn recent_list_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir.path()).unwrap());
        let recent = RecentSearchRegistry::new(store);
        recent.record(RecentSearchEntry::station("S08409", "ROMA TERMINI")).unwrap();
        recent.record(RecentSearchEntry::train("FR 9633", Some("MILANO"), Some("ROMA"))).unwrap();
    }

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir.path()).unwrap());
    let recent = RecentSearchRegistry::new(store);
    let entries = recent.list();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, "FR 9633");
    assert_eq!(entries[1].kind, SearchKind::Station);
}

#[test]
fn legacy_trains_are_migrated_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    let legacy: Vec<serde_json::Value> = (0..7)
        .map(|i| serde_json::json!({ "number": 100 + i, "origin": "A", "destination": "B", "timestamp": i }))
        .collect();
    store
        .set(KEY_LEGACY_RECENT_TRAINS, &serde_json::to_string(&legacy).unwrap())
        .unwrap();

    let recent = RecentSearchRegistry::new(store.clone());
    let entries = recent.list();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0].id, "100");
    assert_eq!(entries[0].name, "100 A → B");
    assert!(entries.iter().all(|e| e.kind == SearchKind::Train));
    assert!(store.get(KEY_LEGACY_RECENT_TRAINS).is_none());
    assert!(store.get(KEY_RECENT_SEARCHES).is_some());
}

#[test]
fn unreadable_legacy_list_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    store.set(KEY_LEGACY_RECENT_TRAINS, "not json").unwrap();

    let recent = RecentSearchRegistry::new(store.clone());
    assert!(recent.list().is_empty());
    assert_eq!(store.get(KEY_LEGACY_RECENT_TRAINS).as_deref(), Some("not json"));
}
