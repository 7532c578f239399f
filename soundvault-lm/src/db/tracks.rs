//! Track queries

use soundvault_common::db::models::TrackRow;
use soundvault_common::{Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Fields accepted when creating a track
#[derive(Debug, Clone)]
pub struct NewTrack {
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration_seconds: Option<f64>,
    pub file_path: String,
}

pub async fn list_tracks(pool: &SqlitePool) -> Result<Vec<TrackRow>> {
    let rows = sqlx::query_as::<_, TrackRow>(
        r#"
        SELECT guid, title, artist, album, duration_seconds, file_path
        FROM tracks
        ORDER BY title COLLATE NOCASE
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Case-insensitive substring search over title, artist, and album
pub async fn search_tracks(pool: &SqlitePool, query: &str) -> Result<Vec<TrackRow>> {
    let pattern = format!("%{}%", query);
    let rows = sqlx::query_as::<_, TrackRow>(
        r#"
        SELECT guid, title, artist, album, duration_seconds, file_path
        FROM tracks
        WHERE title LIKE ?1 OR artist LIKE ?1 OR album LIKE ?1
        ORDER BY title COLLATE NOCASE
        "#,
    )
    .bind(&pattern)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn get_track(pool: &SqlitePool, track_id: Uuid) -> Result<TrackRow> {
    let row = sqlx::query_as::<_, TrackRow>(
        r#"
        SELECT guid, title, artist, album, duration_seconds, file_path
        FROM tracks
        WHERE guid = ?
        "#,
    )
    .bind(track_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.ok_or_else(|| Error::NotFound(format!("Track {}", track_id)))
}

pub async fn insert_track(pool: &SqlitePool, new: &NewTrack) -> Result<TrackRow> {
    let guid = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO tracks (guid, title, artist, album, duration_seconds, file_path)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(&new.title)
    .bind(&new.artist)
    .bind(&new.album)
    .bind(new.duration_seconds)
    .bind(&new.file_path)
    .execute(pool)
    .await?;

    Ok(TrackRow {
        guid,
        title: new.title.clone(),
        artist: new.artist.clone(),
        album: new.album.clone(),
        duration_seconds: new.duration_seconds,
        file_path: new.file_path.clone(),
    })
}

pub async fn update_track(
    pool: &SqlitePool,
    track_id: Uuid,
    title: Option<&str>,
    artist: Option<&str>,
    album: Option<&str>,
) -> Result<TrackRow> {
    sqlx::query(
        r#"
        UPDATE tracks SET
            title = COALESCE(?, title),
            artist = COALESCE(?, artist),
            album = COALESCE(?, album),
            updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(title)
    .bind(artist)
    .bind(album)
    .bind(track_id.to_string())
    .execute(pool)
    .await?;

    get_track(pool, track_id).await
}

/// Delete a track; membership rows, comments, and markers cascade
pub async fn delete_track(pool: &SqlitePool, track_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM tracks WHERE guid = ?")
        .bind(track_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
