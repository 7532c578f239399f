//! Database initialization integration tests

use soundvault_common::db::init::{init_database, init_memory_database};
use tempfile::TempDir;

#[tokio::test]
async fn creates_database_file_and_schema() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("library.db");

    let pool = init_database(&db_path).await.unwrap();
    assert!(db_path.exists());

    // All tables present
    for table in [
        "users",
        "sessions",
        "settings",
        "tracks",
        "playlists",
        "playlist_tracks",
        "comments",
        "markers",
    ] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(exists, "missing table {}", table);
    }
}

#[tokio::test]
async fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("library.db");

    let pool = init_database(&db_path).await.unwrap();
    drop(pool);

    // Second init against the same file must succeed without error
    init_database(&db_path).await.unwrap();
}

#[tokio::test]
async fn default_settings_are_seeded() {
    let pool = init_memory_database().await.unwrap();

    let debounce: Option<String> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = 'reorder_debounce_ms'")
            .fetch_optional(&pool)
            .await
            .unwrap();

    assert_eq!(debounce.as_deref(), Some("1000"));
}

#[tokio::test]
async fn deleting_playlist_cascades_memberships() {
    let pool = init_memory_database().await.unwrap();

    sqlx::query("INSERT INTO tracks (guid, title, file_path) VALUES ('t1', 'Song', '/music/a.mp3')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO playlists (guid, name, display_order) VALUES ('p1', 'Mix', 0)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO playlist_tracks (guid, playlist_id, track_id, position) VALUES ('m1', 'p1', 't1', 0)",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query("DELETE FROM playlists WHERE guid = 'p1'")
        .execute(&pool)
        .await
        .unwrap();

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM playlist_tracks")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}
