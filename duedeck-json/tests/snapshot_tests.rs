use chrono::NaiveDate;
use duedeck_core::schema::{encode_deck, encode_score};
use duedeck_core::source::fetch_collection;
use duedeck_core::{Collection, CoreError, DataSource, DeckService, RawDeck, Score, UserId};
use duedeck_json::{paths, Snapshot, SnapshotStore};
use std::sync::Arc;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn sample() -> Snapshot {
    let decks = (0..5)
        .map(|i| encode_deck(&RawDeck::new(format!("d{i}"), format!("Deck {i}"), "u").with_refs([format!("s{i}")])))
        .collect();
    let scores = (0..5)
        .map(|i| encode_score(&Score::new(format!("s{i}"), 1, 2, d(2023, 1, 1 + i))))
        .collect();
    Snapshot::new(decks, scores)
}

#[tokio::test]
async fn saved_snapshot_is_served_in_pages() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open_with(dir.path().to_path_buf(), 3, 2).unwrap();
    let user = UserId::new("auth0|42");
    store.save_snapshot(&user, sample()).await.unwrap();

    let first = store.fetch_page(&user, Collection::Decks, None).await.unwrap();
    assert_eq!(first.records.len(), 2);
    let stamp = store.load(&user).await.unwrap().unwrap().stamp();
    assert_eq!(first.offset, Some(format!("{stamp}:2")));

    let all = fetch_collection(&store, &user, Collection::Decks).await.unwrap();
    let ids: Vec<&str> = all.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["d0", "d1", "d2", "d3", "d4"]);
}

#[tokio::test]
async fn missing_snapshot_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open_with(dir.path().to_path_buf(), 3, 2).unwrap();
    let out = fetch_collection(&store, &UserId::new("nobody"), Collection::Scores)
        .await
        .unwrap();
    assert!(out.is_empty());
}

#[tokio::test]
async fn bad_cursor_is_a_fetch_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open_with(dir.path().to_path_buf(), 3, 2).unwrap();
    let user = UserId::new("u");
    store.save_snapshot(&user, sample()).await.unwrap();

    let err = store
        .fetch_page(&user, Collection::Decks, Some("abc"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Fetch { .. }));
    let stamp = store.load(&user).await.unwrap().unwrap().stamp();
    let err = store
        .fetch_page(&user, Collection::Decks, Some(&format!("{stamp}:99")))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Fetch { .. }));
}

fn decks(ids: &[&str]) -> Snapshot {
    let decks = ids
        .iter()
        .map(|id| encode_deck(&RawDeck::new(*id, format!("Deck {id}"), "u")))
        .collect();
    Snapshot::new(decks, Vec::new())
}

#[tokio::test]
async fn resave_between_pages_expires_the_cursor() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open_with(dir.path().to_path_buf(), 3, 2).unwrap();
    let user = UserId::new("u");
    store.save_snapshot(&user, decks(&["d1", "d2", "d3", "d4"])).await.unwrap();

    let first = store.fetch_page(&user, Collection::Decks, None).await.unwrap();
    let ids: Vec<&str> = first.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["d1", "d2"]);

    store.save_snapshot(&user, decks(&["d0", "d1", "d2", "d3", "d4"])).await.unwrap();
    let err = store
        .fetch_page(&user, Collection::Decks, first.offset.as_deref())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Fetch { collection: Collection::Decks, .. }));

    // a fresh pass sees only the new file
    let all = fetch_collection(&store, &user, Collection::Decks).await.unwrap();
    let ids: Vec<&str> = all.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["d0", "d1", "d2", "d3", "d4"]);
}

#[tokio::test]
async fn cursor_for_removed_snapshot_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open_with(dir.path().to_path_buf(), 3, 2).unwrap();
    let user = UserId::new("u");
    store.save_snapshot(&user, sample()).await.unwrap();
    let first = store.fetch_page(&user, Collection::Decks, None).await.unwrap();

    std::fs::remove_file(store.user_file(&user)).unwrap();
    let err = store
        .fetch_page(&user, Collection::Decks, first.offset.as_deref())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Fetch { .. }));
}

#[tokio::test]
async fn resave_keeps_created_at_and_rotates_backups() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open_with(dir.path().to_path_buf(), 2, 10).unwrap();
    let user = UserId::new("u");

    store.save_snapshot(&user, sample()).await.unwrap();
    let created = store.load(&user).await.unwrap().unwrap().created_at;
    for _ in 0..4 {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.save_snapshot(&user, sample()).await.unwrap();
    }
    let loaded = store.load(&user).await.unwrap().unwrap();
    assert_eq!(loaded.created_at, created);
    assert!(loaded.updated_at >= created);

    let backups = dir.path().join("backups").join(paths::file_stem("u"));
    let n = std::fs::read_dir(backups).unwrap().count();
    assert_eq!(n, 2);
}

#[tokio::test]
async fn deck_service_over_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SnapshotStore::open_with(dir.path().to_path_buf(), 3, 2).unwrap());
    let user = UserId::new("u");
    store.save_snapshot(&user, sample()).await.unwrap();

    let svc = DeckService::new(store);
    let decks = svc.get_decks_on(&user, d(2023, 2, 1)).await.unwrap();
    assert_eq!(decks.len(), 5);
    assert_eq!(decks[0].due_date, d(2023, 1, 2));
}

#[test]
fn file_stems_do_not_collide() {
    assert_eq!(paths::file_stem("abc-1"), "abc-1");
    assert_ne!(paths::file_stem("a|b"), paths::file_stem("a_b"));
    assert!(!paths::file_stem("../etc").contains('/'));
}
