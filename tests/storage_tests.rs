use chrono::{DateTime, Duration, TimeZone, Utc};
use verssion::storage::models::VersionEntry;
use verssion::storage::{Database, HistoryStore, MemoryStore};

fn test_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("data")).unwrap();
    (dir, db)
}

fn at(seconds: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2017, 9, 1, 12, 0, 0).unwrap() + Duration::seconds(seconds)
}

fn entry(page: &str, version: &str, seconds: i64) -> VersionEntry {
    VersionEntry {
        page: page.to_string(),
        stable_version: version.to_string(),
        homepage: None,
        fetched_at: at(seconds),
    }
}

fn pages(names: &[&str]) -> Vec<String> {
    names.iter().map(|p| p.to_string()).collect()
}

// ============================================================================
// Shared contract, run against every backend
// ============================================================================

async fn check_append_skips_repeats(store: &dyn HistoryStore) {
    assert!(store.append(&entry("Git", "2.14.1", 0)).await.unwrap());
    assert!(!store.append(&entry("Git", "2.14.1", 10)).await.unwrap());
    assert!(store.append(&entry("Git", "2.14.2", 20)).await.unwrap());
    // A release may come back after another one.
    assert!(store.append(&entry("Git", "2.14.1", 30)).await.unwrap());

    let history = store.history(&pages(&["Git"])).await.unwrap();
    let versions: Vec<&str> = history.iter().map(|e| e.stable_version.as_str()).collect();
    assert_eq!(versions, vec!["2.14.1", "2.14.2", "2.14.1"]);

    let latest = store.latest("Git").await.unwrap().unwrap();
    assert_eq!(latest.fetched_at, at(30));
}

async fn check_homepage_change_is_a_release(store: &dyn HistoryStore) {
    let mut first = entry("Debian", "9.1", 0);
    first.homepage = Some("debian.org".to_string());
    assert!(store.append(&first).await.unwrap());

    let mut moved = entry("Debian", "9.1", 10);
    moved.homepage = Some("www.debian.org".to_string());
    assert!(store.append(&moved).await.unwrap());

    assert_eq!(store.history(&pages(&["Debian"])).await.unwrap().len(), 2);
}

async fn check_history_is_merged_chronologically(store: &dyn HistoryStore) {
    store.append(&entry("A", "1", 0)).await.unwrap();
    store.append(&entry("B", "1", 5)).await.unwrap();
    store.append(&entry("A", "2", 10)).await.unwrap();
    store.append(&entry("C", "1", 15)).await.unwrap();

    let history = store
        .history(&pages(&["B", "A", "Unknown", "A"]))
        .await
        .unwrap();
    let seen: Vec<(&str, &str)> = history
        .iter()
        .map(|e| (e.page.as_str(), e.stable_version.as_str()))
        .collect();
    assert_eq!(seen, vec![("A", "1"), ("B", "1"), ("A", "2")]);

    assert!(store.history(&[]).await.unwrap().is_empty());
}

async fn check_recent_and_known(store: &dyn HistoryStore) {
    assert!(store.known().await.unwrap().is_empty());
    assert!(store.recent(10).await.unwrap().is_empty());

    store.append(&entry("Rust", "1.20", 0)).await.unwrap();
    store.append(&entry("Go", "1.9", 5)).await.unwrap();
    store.append(&entry("Rust", "1.21", 10)).await.unwrap();
    store.append(&entry("Zig", "0.1", 1)).await.unwrap();

    let recent = store.recent(2).await.unwrap();
    let seen: Vec<(&str, &str)> = recent
        .iter()
        .map(|e| (e.page.as_str(), e.stable_version.as_str()))
        .collect();
    assert_eq!(seen, vec![("Rust", "1.21"), ("Go", "1.9")]);

    assert_eq!(store.recent(10).await.unwrap().len(), 3);
    assert_eq!(store.known().await.unwrap(), pages(&["Go", "Rust", "Zig"]));
}

async fn check_curated_lifecycle(store: &dyn HistoryStore) {
    let id = store.create_curated().await.unwrap();
    let created = store.load_curated(&id).await.unwrap().unwrap();
    assert_eq!(created.id, id);
    assert!(created.pages.is_empty());
    assert_eq!(created.custom_title, None);
    assert_eq!(created.used_at, None);

    store
        .curated_set_pages(&id, &pages(&["Rust", "Go", "Rust"]))
        .await
        .unwrap();
    let updated = store.load_curated(&id).await.unwrap().unwrap();
    assert_eq!(updated.pages, pages(&["Go", "Rust"]));
    assert!(updated.last_updated >= created.last_updated);
    assert_eq!(updated.title(), "Go, Rust");

    store.curated_set_title(&id, "Languages").await.unwrap();
    let titled = store.load_curated(&id).await.unwrap().unwrap();
    assert_eq!(titled.custom_title.as_deref(), Some("Languages"));
    assert_eq!(titled.title(), "Languages");

    store.curated_set_title(&id, "").await.unwrap();
    let cleared = store.load_curated(&id).await.unwrap().unwrap();
    assert_eq!(cleared.custom_title, None);

    store.curated_set_used(&id).await.unwrap();
    let used = store.load_curated(&id).await.unwrap().unwrap();
    assert!(used.used_at.is_some());

    let other = store.create_curated().await.unwrap();
    assert_ne!(other, id);
}

async fn check_unknown_curated(store: &dyn HistoryStore) {
    assert!(store.load_curated("no-such-list").await.unwrap().is_none());
    assert!(store
        .curated_set_pages("no-such-list", &pages(&["Rust"]))
        .await
        .is_err());
    assert!(store.curated_set_title("no-such-list", "x").await.is_err());
    assert!(store.curated_set_used("no-such-list").await.is_err());
}

async fn check_save_curated(store: &dyn HistoryStore) {
    let id = store
        .save_curated(None, &pages(&["Rust", "Go", "Go"]), "")
        .await
        .unwrap();
    let created = store.load_curated(&id).await.unwrap().unwrap();
    assert_eq!(created.pages, pages(&["Go", "Rust"]));
    assert_eq!(created.custom_title, None);

    let same = store
        .save_curated(Some(&id), &pages(&["Zig"]), " Languages ")
        .await
        .unwrap();
    assert_eq!(same, id);
    let edited = store.load_curated(&id).await.unwrap().unwrap();
    assert_eq!(edited.pages, pages(&["Zig"]));
    assert_eq!(edited.custom_title.as_deref(), Some("Languages"));
    assert!(edited.last_updated >= created.last_updated);

    assert!(store
        .save_curated(Some("no-such-list"), &pages(&["Go"]), "x")
        .await
        .is_err());
    assert!(store.load_curated("no-such-list").await.unwrap().is_none());
}

async fn check_contract(store: &dyn HistoryStore) {
    check_append_skips_repeats(store).await;
    check_homepage_change_is_a_release(store).await;
    check_history_is_merged_chronologically(store).await;
    check_curated_lifecycle(store).await;
    check_unknown_curated(store).await;
    check_save_curated(store).await;
}

#[tokio::test]
async fn test_memory_store_contract() {
    check_contract(&MemoryStore::new()).await;
    check_recent_and_known(&MemoryStore::new()).await;
}

#[tokio::test]
async fn test_redb_store_contract() {
    let (_dir, db) = test_db();
    check_contract(&db).await;

    let (_dir, db) = test_db();
    check_recent_and_known(&db).await;
}

// ============================================================================
// redb specifics
// ============================================================================

#[tokio::test]
async fn test_redb_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data");

    let id = {
        let db = Database::open(&path).unwrap();
        db.append(&entry("Git", "2.14.2", 0)).await.unwrap();
        let id = db.create_curated().await.unwrap();
        db.curated_set_pages(&id, &pages(&["Git"])).await.unwrap();
        id
    };

    let db = Database::open(&path).unwrap();
    let latest = db.latest("Git").await.unwrap().unwrap();
    assert_eq!(latest.stable_version, "2.14.2");
    assert_eq!(latest.fetched_at, at(0));

    let curated = db.load_curated(&id).await.unwrap().unwrap();
    assert_eq!(curated.pages, pages(&["Git"]));

    // Still deduplicated against the persisted latest entry.
    assert!(!db.append(&entry("Git", "2.14.2", 60)).await.unwrap());
}

#[tokio::test]
async fn test_concurrent_appends_write_once() {
    let (_dir, db) = test_db();

    let mut handles = Vec::new();
    for i in 0..8 {
        let db = db.clone();
        handles.push(tokio::spawn(async move {
            db.append(&entry("Git", "2.14.2", i)).await.unwrap()
        }));
    }

    let mut written = 0;
    for handle in handles {
        if handle.await.unwrap() {
            written += 1;
        }
    }
    assert_eq!(written, 1);
    assert_eq!(db.history(&pages(&["Git"])).await.unwrap().len(), 1);
}
