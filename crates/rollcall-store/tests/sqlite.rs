//! SQLite backend tests against a real on-disk database.

use chrono::{Duration, Utc};
use rollcall_store::{AttendanceStore, SqliteAttendanceStore};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

async fn store_in(dir: &tempfile::TempDir) -> SqliteAttendanceStore {
    let options = SqliteConnectOptions::new()
        .filename(dir.path().join("rollcall.sqlite"))
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .unwrap();
    let store = SqliteAttendanceStore::with_pool(pool);
    store.ensure_schema().await.unwrap();
    store
}

#[tokio::test]
async fn insert_is_idempotent_per_pair() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir).await;

    let first = store
        .insert_attendance_if_absent(
            "sess-42",
            "student-7",
            "teacher-1",
            serde_json::json!({ "client": "kiosk" }),
        )
        .await
        .unwrap();
    assert!(first.inserted);
    assert_eq!(first.record.session_id, "sess-42");
    assert_eq!(first.record.metadata, serde_json::json!({ "client": "kiosk" }));

    let second = store
        .insert_attendance_if_absent("sess-42", "student-7", "teacher-1", serde_json::Value::Null)
        .await
        .unwrap();
    assert!(!second.inserted);
    assert_eq!(second.record.id, first.record.id);
    assert_eq!(second.record.recorded_at, first.record.recorded_at);
}

#[tokio::test]
async fn uniqueness_is_scoped_to_the_pair() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir).await;

    for (session, holder) in [("sess-42", "a"), ("sess-42", "b"), ("sess-43", "a")] {
        let outcome = store
            .insert_attendance_if_absent(session, holder, "t", serde_json::Value::Null)
            .await
            .unwrap();
        assert!(outcome.inserted, "{session}/{holder} should be new");
    }
}

#[tokio::test]
async fn ensure_schema_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir).await;
    store.ensure_schema().await.unwrap();
}

#[tokio::test]
async fn sweep_clears_stale_issuance_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir).await;
    let now = Utc::now();

    store
        .record_checkin_issued("old", "t", now - Duration::hours(48))
        .await
        .unwrap();
    store.record_checkin_issued("fresh", "t", now).await.unwrap();
    // Re-recording the same issuance is ignored, not duplicated.
    store.record_checkin_issued("fresh", "t", now).await.unwrap();

    let cutoff = now - Duration::hours(24);
    assert_eq!(store.sweep_expired_checkin_metadata(cutoff).await.unwrap(), 1);
    assert_eq!(store.sweep_expired_checkin_metadata(cutoff).await.unwrap(), 0);
}
