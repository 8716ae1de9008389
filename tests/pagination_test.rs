use serde_json::{json, Value};
use shelf_sync::config::{Environment, LibraryConfig};
use shelf_sync::lifecycle::LibrarySystem;
use shelf_sync::pagination::{LoadOutcome, SkipReason};
use shelf_sync::session::{StaticRequestContext, StaticSession};
use shelf_sync::transport::mock::MockTransport;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

fn system(mock: &MockTransport, page_size: usize) -> LibrarySystem {
    let config = LibraryConfig {
        environment: Environment::Development,
        page_size,
        ..LibraryConfig::default()
    };
    LibrarySystem::new(
        config,
        Arc::new(mock.clone()),
        Arc::new(StaticSession::anonymous()),
        Arc::new(StaticRequestContext::default()),
    )
}

fn books(range: Range<usize>) -> Value {
    Value::Array(
        range
            .map(|n| json!({ "id": format!("book_{}", n), "title": format!("Book {}", n) }))
            .collect(),
    )
}

/// 120 books in pages of 50, with the last page overlapping the previous one.
#[tokio::test]
async fn test_pages_merge_into_unique_collection() {
    let mock = MockTransport::new();
    mock.expect_get("profileId=user_1&page=0&size=50")
        .return_json(json!({ "items": books(0..50), "hasMore": true }));
    mock.expect_get("profileId=user_1&page=1&size=50")
        .return_json(json!({ "items": books(50..100), "hasMore": true }));
    mock.expect_get("profileId=user_1&page=2&size=50")
        .return_json(json!({ "items": books(95..120), "hasMore": false }));

    let mut system = system(&mock, 50);
    let shelf = system.open_shelf(Some("user_1".into()));

    let mut outcomes = Vec::new();
    for _ in 0..4 {
        outcomes.push(shelf.load_next_page().await.expect("actor gone"));
    }
    assert_eq!(
        outcomes,
        vec![
            LoadOutcome::Loaded { added: 50, has_more: true },
            LoadOutcome::Loaded { added: 50, has_more: true },
            LoadOutcome::Loaded { added: 20, has_more: false },
            LoadOutcome::Skipped(SkipReason::Exhausted),
        ]
    );
    assert_eq!(mock.call_count(), 3);

    let snapshot = shelf.snapshot().await.expect("actor gone");
    assert_eq!(snapshot.items.len(), 120);
    assert_eq!(snapshot.cursor, 3);
    assert!(!snapshot.has_more);
    assert!(!snapshot.is_loading);
    let expected: Vec<String> = (0..120).map(|n| format!("book_{}", n)).collect();
    let ids: Vec<String> = snapshot.items.iter().map(|b| b.id.clone()).collect();
    assert_eq!(ids, expected);
    mock.verify();

    drop(shelf);
    system.shutdown().await.expect("shutdown failed");
}

/// A second load while one is in flight is dropped, not queued.
#[tokio::test(start_paused = true)]
async fn test_concurrent_loads_make_one_request() {
    let mock = MockTransport::new();
    mock.expect_get("page=0")
        .after(Duration::from_millis(200))
        .return_json(json!({ "items": books(0..10), "hasMore": true }));

    let mut system = system(&mock, 10);
    let shelf = system.open_shelf(Some("user_1".into()));

    let (first, second) = tokio::join!(shelf.load_next_page(), shelf.load_next_page());
    let mut outcomes = vec![first.expect("actor gone"), second.expect("actor gone")];
    outcomes.sort_by_key(|o| matches!(o, LoadOutcome::Skipped(_)));

    assert_eq!(outcomes[0], LoadOutcome::Loaded { added: 10, has_more: true });
    assert_eq!(outcomes[1], LoadOutcome::Skipped(SkipReason::InFlight));
    assert_eq!(mock.call_count(), 1);

    let snapshot = shelf.snapshot().await.expect("actor gone");
    assert_eq!(snapshot.cursor, 1);
    assert_eq!(snapshot.items.len(), 10);

    drop(shelf);
    system.shutdown().await.expect("shutdown failed");
}

/// An empty page ends pagination without moving the cursor.
#[tokio::test]
async fn test_empty_page_exhausts_collection() {
    let mock = MockTransport::new();
    mock.expect_get("page=0").return_json(json!({ "items": books(0..5), "hasMore": true }));
    mock.expect_get("page=1").return_json(json!({ "items": [], "hasMore": true }));

    let mut system = system(&mock, 5);
    let shelf = system.open_shelf(Some("user_1".into()));

    shelf.load_next_page().await.expect("actor gone");
    let outcome = shelf.load_next_page().await.expect("actor gone");
    assert_eq!(outcome, LoadOutcome::Exhausted);

    let snapshot = shelf.snapshot().await.expect("actor gone");
    assert_eq!(snapshot.cursor, 1);
    assert_eq!(snapshot.items.len(), 5);
    assert!(!snapshot.has_more);

    assert_eq!(shelf.load_next_page().await.expect("actor gone"), LoadOutcome::Skipped(SkipReason::Exhausted));
    assert_eq!(mock.call_count(), 2);

    drop(shelf);
    system.shutdown().await.expect("shutdown failed");
}

/// A failed page is recorded, stops pagination, and a reset recovers.
#[tokio::test]
async fn test_failed_page_halts_until_reset() {
    let mock = MockTransport::new();
    mock.expect_get("page=0").return_status(500, "boom");
    mock.expect_get("page=0").return_json(json!({ "items": books(0..3), "hasMore": false }));

    let mut system = system(&mock, 50);
    let shelf = system.open_shelf(Some("user_1".into()));

    let outcome = shelf.load_next_page().await.expect("actor gone");
    assert!(matches!(outcome, LoadOutcome::Failed(_)));

    let snapshot = shelf.snapshot().await.expect("actor gone");
    assert!(snapshot.last_error.as_deref().is_some_and(|e| e.contains("500")));
    assert!(!snapshot.has_more);
    assert!(!snapshot.is_loading);
    assert_eq!(shelf.load_next_page().await.expect("actor gone"), LoadOutcome::Skipped(SkipReason::Exhausted));

    shelf.reset_pagination(Some("user_1".into())).await.expect("actor gone");
    let outcome = shelf.load_next_page().await.expect("actor gone");
    assert_eq!(outcome, LoadOutcome::Loaded { added: 3, has_more: false });
    assert!(shelf.snapshot().await.expect("actor gone").last_error.is_none());
    mock.verify();

    drop(shelf);
    system.shutdown().await.expect("shutdown failed");
}

/// Resetting always starts clean, whatever state the shelf was in.
#[tokio::test]
async fn test_reset_switches_subject_with_fresh_state() {
    let mock = MockTransport::new();
    mock.expect_get("profileId=user_1&page=0").return_json(json!({ "items": books(0..2), "hasMore": true }));
    mock.expect_get("profileId=user_2&page=0").return_json(json!({ "items": books(10..11), "hasMore": false }));

    let mut system = system(&mock, 2);
    let shelf = system.open_shelf(Some("user_1".into()));
    shelf.load_next_page().await.expect("actor gone");

    shelf.reset_pagination(Some("user_2".into())).await.expect("actor gone");
    let fresh = shelf.snapshot().await.expect("actor gone");
    assert_eq!(fresh.subject.as_deref(), Some("user_2"));
    assert!(fresh.items.is_empty());
    assert_eq!(fresh.cursor, 0);
    assert!(fresh.has_more);
    assert!(!fresh.is_loading);

    shelf.load_next_page().await.expect("actor gone");
    let snapshot = shelf.snapshot().await.expect("actor gone");
    let ids: Vec<&str> = snapshot.items.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["book_10"]);
    mock.verify();

    drop(shelf);
    system.shutdown().await.expect("shutdown failed");
}

/// Without a subject nothing is fetched.
#[tokio::test]
async fn test_missing_subject_skips_load() {
    let mock = MockTransport::new();
    let mut system = system(&mock, 50);
    let shelf = system.open_shelf(None);

    let outcome = shelf.load_next_page().await.expect("actor gone");
    assert_eq!(outcome, LoadOutcome::Skipped(SkipReason::NoSubject));
    assert_eq!(mock.call_count(), 0);

    drop(shelf);
    system.shutdown().await.expect("shutdown failed");
}

/// A bare array page has more exactly when it is full.
#[tokio::test]
async fn test_bare_array_pages_infer_continuation() {
    let mock = MockTransport::new();
    mock.expect_get("page=0&size=2").return_json(books(0..2));
    mock.expect_get("page=1&size=2").return_json(books(2..3));

    let mut system = system(&mock, 2);
    let shelf = system.open_shelf(Some("user_1".into()));

    let snapshot = shelf.load_all().await.expect("actor gone");
    assert_eq!(snapshot.items.len(), 3);
    assert_eq!(snapshot.cursor, 2);
    assert!(!snapshot.has_more);
    mock.verify();

    drop(shelf);
    system.shutdown().await.expect("shutdown failed");
}

/// A shelf whose owner does not exist is simply empty.
#[tokio::test]
async fn test_unknown_profile_is_empty_collection() {
    let mock = MockTransport::new();
    mock.expect_get("profileId=ghost").return_status(404, "not found");

    let mut system = system(&mock, 50);
    let shelf = system.open_shelf(Some("ghost".into()));

    assert_eq!(shelf.load_next_page().await.expect("actor gone"), LoadOutcome::Exhausted);
    let snapshot = shelf.snapshot().await.expect("actor gone");
    assert!(snapshot.items.is_empty());
    assert!(snapshot.last_error.is_none());

    drop(shelf);
    system.shutdown().await.expect("shutdown failed");
}
