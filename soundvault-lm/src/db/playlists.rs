//! Playlist and membership queries
//!
//! Order writes take the full new order as a sequence of ids and assign
//! position = index within that sequence. Callers treat zero affected
//! rows as a hard failure even when the statements themselves succeed.

use soundvault_common::db::models::{PlaylistRow, PlaylistTrackRow, TrackRow};
use soundvault_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

pub async fn list_playlists(pool: &SqlitePool) -> Result<Vec<PlaylistRow>> {
    let rows = sqlx::query_as::<_, PlaylistRow>(
        r#"
        SELECT guid, name, description, display_order
        FROM playlists
        ORDER BY display_order, name COLLATE NOCASE
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn get_playlist(pool: &SqlitePool, playlist_id: Uuid) -> Result<PlaylistRow> {
    let row = sqlx::query_as::<_, PlaylistRow>(
        "SELECT guid, name, description, display_order FROM playlists WHERE guid = ?",
    )
    .bind(playlist_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.ok_or_else(|| Error::NotFound(format!("Playlist {}", playlist_id)))
}

/// Create a playlist at the end of the display order
pub async fn insert_playlist(
    pool: &SqlitePool,
    name: &str,
    description: Option<&str>,
) -> Result<PlaylistRow> {
    let guid = Uuid::new_v4().to_string();

    let next_order: i64 =
        sqlx::query_scalar("SELECT COALESCE(MAX(display_order) + 1, 0) FROM playlists")
            .fetch_one(pool)
            .await?;

    sqlx::query(
        "INSERT INTO playlists (guid, name, description, display_order) VALUES (?, ?, ?, ?)",
    )
    .bind(&guid)
    .bind(name)
    .bind(description)
    .bind(next_order)
    .execute(pool)
    .await?;

    Ok(PlaylistRow {
        guid,
        name: name.to_string(),
        description: description.map(str::to_string),
        display_order: next_order,
    })
}

pub async fn update_playlist(
    pool: &SqlitePool,
    playlist_id: Uuid,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<PlaylistRow> {
    sqlx::query(
        r#"
        UPDATE playlists SET
            name = COALESCE(?, name),
            description = COALESCE(?, description),
            updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(playlist_id.to_string())
    .execute(pool)
    .await?;

    get_playlist(pool, playlist_id).await
}

/// Delete a playlist; membership rows cascade
pub async fn delete_playlist(pool: &SqlitePool, playlist_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM playlists WHERE guid = ?")
        .bind(playlist_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// List a playlist's tracks in position order, joined with track metadata
///
/// Returns one element per membership row: the same track appears once
/// per occurrence in the playlist.
pub async fn list_playlist_tracks(
    pool: &SqlitePool,
    playlist_id: Uuid,
) -> Result<Vec<(PlaylistTrackRow, TrackRow)>> {
    #[derive(sqlx::FromRow)]
    struct JoinedRow {
        membership_guid: String,
        playlist_id: String,
        position: i64,
        guid: String,
        title: String,
        artist: Option<String>,
        album: Option<String>,
        duration_seconds: Option<f64>,
        file_path: String,
    }

    let rows = sqlx::query_as::<_, JoinedRow>(
        r#"
        SELECT pt.guid AS membership_guid, pt.playlist_id, pt.position,
               t.guid, t.title, t.artist, t.album, t.duration_seconds, t.file_path
        FROM playlist_tracks pt
        JOIN tracks t ON t.guid = pt.track_id
        WHERE pt.playlist_id = ?
        ORDER BY pt.position
        "#,
    )
    .bind(playlist_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| {
            (
                PlaylistTrackRow {
                    guid: r.membership_guid,
                    playlist_id: r.playlist_id,
                    track_id: r.guid.clone(),
                    position: r.position,
                },
                TrackRow {
                    guid: r.guid,
                    title: r.title,
                    artist: r.artist,
                    album: r.album,
                    duration_seconds: r.duration_seconds,
                    file_path: r.file_path,
                },
            )
        })
        .collect())
}

/// Persist a full track ordering for one playlist
///
/// Assigns position = index for each membership id in `ordered_ids`, in a
/// single transaction. Returns the number of rows actually updated; the
/// caller treats 0 as a failed write even though the SQL succeeded.
pub async fn update_track_order(
    pool: &SqlitePool,
    playlist_id: Uuid,
    ordered_ids: &[Uuid],
) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let mut changes: u64 = 0;

    for (index, membership_id) in ordered_ids.iter().enumerate() {
        let result = sqlx::query(
            "UPDATE playlist_tracks SET position = ? WHERE guid = ? AND playlist_id = ?",
        )
        .bind(index as i64)
        .bind(membership_id.to_string())
        .bind(playlist_id.to_string())
        .execute(&mut *tx)
        .await?;

        changes += result.rows_affected();
    }

    tx.commit().await?;

    debug!(
        "Persisted track order for playlist {}: {} of {} rows updated",
        playlist_id,
        changes,
        ordered_ids.len()
    );

    Ok(changes)
}

/// Persist a full playlist-list ordering
///
/// All-or-nothing: a single id matching zero rows fails the whole batch.
/// The updates run inside one transaction, so a failed batch leaves the
/// stored order untouched.
pub async fn update_playlist_order(pool: &SqlitePool, ordered_ids: &[Uuid]) -> Result<()> {
    let mut tx = pool.begin().await?;

    for (index, playlist_id) in ordered_ids.iter().enumerate() {
        let result = sqlx::query("UPDATE playlists SET display_order = ? WHERE guid = ?")
            .bind(index as i64)
            .bind(playlist_id.to_string())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(Error::WriteRejected(format!(
                "Playlist {} no longer exists; order not saved",
                playlist_id
            )));
        }
    }

    tx.commit().await?;
    Ok(())
}

/// Add a track to a playlist at the end
///
/// With `allow_duplicate` false the call is rejected when the track is
/// already a member; with true a second membership row is created.
pub async fn add_membership(
    pool: &SqlitePool,
    playlist_id: Uuid,
    track_id: Uuid,
    allow_duplicate: bool,
) -> Result<PlaylistTrackRow> {
    // Reject unknown tracks up front so batch callers get a per-item error
    let track_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tracks WHERE guid = ?)")
        .bind(track_id.to_string())
        .fetch_one(pool)
        .await?;
    if !track_exists {
        return Err(Error::NotFound(format!("Track {}", track_id)));
    }

    if !allow_duplicate {
        let already: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM playlist_tracks WHERE playlist_id = ? AND track_id = ?)",
        )
        .bind(playlist_id.to_string())
        .bind(track_id.to_string())
        .fetch_one(pool)
        .await?;

        if already {
            return Err(Error::InvalidInput(format!(
                "Track {} is already in playlist {}",
                track_id, playlist_id
            )));
        }
    }

    let guid = Uuid::new_v4().to_string();
    let next_position: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM playlist_tracks WHERE playlist_id = ?",
    )
    .bind(playlist_id.to_string())
    .fetch_one(pool)
    .await?;

    sqlx::query(
        "INSERT INTO playlist_tracks (guid, playlist_id, track_id, position) VALUES (?, ?, ?, ?)",
    )
    .bind(&guid)
    .bind(playlist_id.to_string())
    .bind(track_id.to_string())
    .bind(next_position)
    .execute(pool)
    .await?;

    Ok(PlaylistTrackRow {
        guid,
        playlist_id: playlist_id.to_string(),
        track_id: track_id.to_string(),
        position: next_position,
    })
}

/// Remove one membership row (one occurrence of a track)
pub async fn remove_membership(pool: &SqlitePool, membership_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM playlist_tracks WHERE guid = ?")
        .bind(membership_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
