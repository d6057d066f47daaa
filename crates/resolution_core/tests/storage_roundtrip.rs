use resolution_core::{
    open_db, JournalEntry, KeyValueStore, MemoryKeyValueStore, Milestone, Resolution,
    ResolutionStore, SqliteKeyValueStore, STORAGE_KEY,
};

fn sample_collection() -> Vec<Resolution> {
    let mut french = Resolution::new("Learn French", "Reach B1");
    french.whats_next = "Book a tutor".to_string();
    french
        .milestones
        .push(Milestone::new("A1 course", Some("2026-03-01".to_string())));
    french.milestones.push(Milestone::new("A2 course", None));
    let first_course = french.milestones[0].id.clone();
    french.toggle_milestone(&first_course, "2026-02-10T08:00:00.000Z");
    french.add_journal_entry(JournalEntry::new("Ordered croissants in French"));

    let mut running = Resolution::new("Run a half marathon", "");
    running.milestones.push(Milestone::new("10k", None));
    let ten_k = running.milestones[0].id.clone();
    running.toggle_milestone(&ten_k, "2026-04-01T07:30:00.000Z");
    running.mark_completed("2026-04-01T07:30:01.000Z");

    vec![french, running, Resolution::new("Untouched", "")]
}

#[test]
fn save_then_load_roundtrips_collection() {
    let store = ResolutionStore::new(MemoryKeyValueStore::new());
    let resolutions = sample_collection();

    store.save(&resolutions).unwrap();

    assert_eq!(store.load(), resolutions);
}

#[test]
fn save_empty_then_load_returns_empty() {
    let store = ResolutionStore::new(MemoryKeyValueStore::new());

    store.save(&[]).unwrap();

    assert!(store.try_load().unwrap().is_empty());
    assert!(store.load().is_empty());
}

#[test]
fn load_without_stored_key_returns_empty() {
    let store = ResolutionStore::new(MemoryKeyValueStore::new());
    assert!(store.load().is_empty());
}

#[test]
fn save_replaces_previous_collection() {
    let store = ResolutionStore::new(MemoryKeyValueStore::new());
    let mut resolutions = sample_collection();
    store.save(&resolutions).unwrap();

    resolutions.remove(0);
    store.save(&resolutions).unwrap();

    let loaded = store.load();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded, resolutions);
}

#[test]
fn corrupted_values_load_as_empty() {
    let kv = MemoryKeyValueStore::new();
    let store = ResolutionStore::new(&kv);

    for corrupted in [
        "{not json",
        "42",
        "\"hello\"",
        "null",
        r#"{"version": 1, "resolutions": [{"id": 5}]}"#,
        r#"[{"title": "missing id"}]"#,
        r#"[1, 2, 3]"#,
    ] {
        kv.set(STORAGE_KEY, corrupted).unwrap();
        assert!(store.load().is_empty(), "value={corrupted}");
    }
}

#[test]
fn legacy_bare_array_loads_as_resolutions() {
    let kv = MemoryKeyValueStore::new();
    kv.set(
        STORAGE_KEY,
        r#"[{
            "id": "lx8k2a9f3q",
            "title": "Meditate",
            "description": "",
            "whatsNext": "Sit for two minutes",
            "milestones": [
                {"id": "m1", "title": "First week", "targetDate": "2025-01-08T00:00:00.000Z", "completed": true, "completedAt": "2025-01-07T21:00:00.000Z"}
            ],
            "journalEntries": [],
            "createdAt": "2025-01-01T10:00:00.000Z"
        }]"#,
    )
    .unwrap();
    let store = ResolutionStore::new(&kv);

    let loaded = store.load();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "lx8k2a9f3q");
    assert_eq!(loaded[0].whats_next, "Sit for two minutes");
    assert!(loaded[0].is_complete());
    assert_eq!(
        loaded[0].milestones[0].target_day().map(|d| d.to_string()),
        Some("2025-01-08".to_string())
    );

    store.save(&loaded).unwrap();
    let rewritten: serde_json::Value =
        serde_json::from_str(&kv.get(STORAGE_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(rewritten["version"], 1);
    assert_eq!(rewritten["resolutions"][0]["id"], "lx8k2a9f3q");
}

#[test]
fn future_version_document_loads_and_is_normalized_on_save() {
    let kv = MemoryKeyValueStore::new();
    kv.set(
        STORAGE_KEY,
        r#"{"version": 7, "resolutions": [{"id": "a", "title": "Keep"}], "theme": "dark"}"#,
    )
    .unwrap();
    let store = ResolutionStore::new(&kv);

    let loaded = store.load();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].title, "Keep");

    store.save(&loaded).unwrap();
    let rewritten: serde_json::Value =
        serde_json::from_str(&kv.get(STORAGE_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(rewritten["version"], 1);
    assert!(rewritten.get("theme").is_none());
}

#[test]
fn sqlite_store_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resolutions.sqlite3");
    let resolutions = sample_collection();

    {
        let conn = open_db(&path).unwrap();
        let store = ResolutionStore::new(SqliteKeyValueStore::new(&conn));
        store.save(&resolutions).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let store = ResolutionStore::new(SqliteKeyValueStore::new(&conn));
    assert_eq!(store.load(), resolutions);
}
