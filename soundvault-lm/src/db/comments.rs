//! Comment and marker queries
//!
//! A comment may own exactly one marker; comment + marker creation is a
//! single transaction so the pair is never half-persisted.

use soundvault_common::db::models::{CommentRow, MarkerRow};
use soundvault_common::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Marker fields supplied when creating a timestamped comment
#[derive(Debug, Clone)]
pub struct NewMarker {
    pub time_seconds: f64,
    pub color: Option<String>,
}

/// Fetch a track's comments newest-first, each with its marker if any
pub async fn fetch_comments_with_markers(
    pool: &SqlitePool,
    track_id: Uuid,
) -> Result<Vec<(CommentRow, Option<MarkerRow>)>> {
    #[derive(sqlx::FromRow)]
    struct JoinedRow {
        guid: String,
        track_id: String,
        content: String,
        time_seconds: f64,
        created_at: String,
        marker_guid: Option<String>,
        marker_time: Option<f64>,
        region_id: Option<String>,
        color: Option<String>,
    }

    let rows = sqlx::query_as::<_, JoinedRow>(
        r#"
        SELECT c.guid, c.track_id, c.content, c.time_seconds, c.created_at,
               m.guid AS marker_guid, m.time_seconds AS marker_time,
               m.region_id, m.color
        FROM comments c
        LEFT JOIN markers m ON m.comment_id = c.guid
        WHERE c.track_id = ?
        ORDER BY c.created_at DESC, c.guid DESC
        "#,
    )
    .bind(track_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| {
            let marker = match (r.marker_guid, r.region_id) {
                (Some(marker_guid), Some(region_id)) => Some(MarkerRow {
                    guid: marker_guid,
                    comment_id: r.guid.clone(),
                    track_id: r.track_id.clone(),
                    time_seconds: r.marker_time.unwrap_or(r.time_seconds),
                    region_id,
                    color: r.color,
                }),
                _ => None,
            };
            (
                CommentRow {
                    guid: r.guid,
                    track_id: r.track_id,
                    content: r.content,
                    time_seconds: r.time_seconds,
                    created_at: r.created_at,
                },
                marker,
            )
        })
        .collect())
}

/// Create a comment, and its marker when `marker` is given, in one transaction
pub async fn insert_comment_with_marker(
    pool: &SqlitePool,
    track_id: Uuid,
    content: &str,
    time_seconds: f64,
    marker: Option<NewMarker>,
) -> Result<(CommentRow, Option<MarkerRow>)> {
    let comment_guid = Uuid::new_v4().to_string();
    let created_at = chrono::Utc::now().to_rfc3339();

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO comments (guid, track_id, content, time_seconds, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&comment_guid)
    .bind(track_id.to_string())
    .bind(content)
    .bind(time_seconds)
    .bind(&created_at)
    .execute(&mut *tx)
    .await?;

    let marker_row = if let Some(new_marker) = marker {
        let marker_guid = Uuid::new_v4().to_string();
        // Region ids are opaque to the store; the waveform renderer
        // correlates overlays by this value
        let region_id = format!("wave-region-{}", marker_guid);

        sqlx::query(
            r#"
            INSERT INTO markers (guid, comment_id, track_id, time_seconds, region_id, color)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&marker_guid)
        .bind(&comment_guid)
        .bind(track_id.to_string())
        .bind(new_marker.time_seconds)
        .bind(&region_id)
        .bind(&new_marker.color)
        .execute(&mut *tx)
        .await?;

        Some(MarkerRow {
            guid: marker_guid,
            comment_id: comment_guid.clone(),
            track_id: track_id.to_string(),
            time_seconds: new_marker.time_seconds,
            region_id,
            color: new_marker.color,
        })
    } else {
        None
    };

    tx.commit().await?;

    Ok((
        CommentRow {
            guid: comment_guid,
            track_id: track_id.to_string(),
            content: content.to_string(),
            time_seconds,
            created_at,
        },
        marker_row,
    ))
}

/// Delete a comment; its marker cascades
pub async fn delete_comment(pool: &SqlitePool, comment_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE guid = ?")
        .bind(comment_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tracks::{insert_track, NewTrack};
    use soundvault_common::db::init::init_memory_database;

    async fn seed_track(pool: &SqlitePool) -> Uuid {
        let row = insert_track(
            pool,
            &NewTrack {
                title: "Song".to_string(),
                artist: None,
                album: None,
                duration_seconds: Some(180.0),
                file_path: "/m/s.mp3".to_string(),
            },
        )
        .await
        .unwrap();
        Uuid::parse_str(&row.guid).unwrap()
    }

    #[tokio::test]
    async fn comment_with_marker_round_trips() {
        let pool = init_memory_database().await.unwrap();
        let track = seed_track(&pool).await;

        let (comment, marker) = insert_comment_with_marker(
            &pool,
            track,
            "nice drop",
            42.5,
            Some(NewMarker { time_seconds: 42.5, color: Some("#ff0000".to_string()) }),
        )
        .await
        .unwrap();

        let marker = marker.unwrap();
        assert_eq!(marker.comment_id, comment.guid);
        assert!(marker.region_id.starts_with("wave-region-"));

        let fetched = fetch_comments_with_markers(&pool, track).await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert!(fetched[0].1.is_some());
    }

    #[tokio::test]
    async fn comment_without_marker_has_none() {
        let pool = init_memory_database().await.unwrap();
        let track = seed_track(&pool).await;

        insert_comment_with_marker(&pool, track, "plain note", 0.0, None)
            .await
            .unwrap();

        let fetched = fetch_comments_with_markers(&pool, track).await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert!(fetched[0].1.is_none());
    }

    #[tokio::test]
    async fn fetch_orders_newest_first() {
        let pool = init_memory_database().await.unwrap();
        let track = seed_track(&pool).await;

        insert_comment_with_marker(&pool, track, "first", 1.0, None).await.unwrap();
        insert_comment_with_marker(&pool, track, "second", 2.0, None).await.unwrap();

        let fetched = fetch_comments_with_markers(&pool, track).await.unwrap();
        assert_eq!(fetched[0].0.content, "second");
        assert_eq!(fetched[1].0.content, "first");
    }

    #[tokio::test]
    async fn deleting_comment_removes_marker() {
        let pool = init_memory_database().await.unwrap();
        let track = seed_track(&pool).await;

        let (comment, _) = insert_comment_with_marker(
            &pool,
            track,
            "with marker",
            5.0,
            Some(NewMarker { time_seconds: 5.0, color: None }),
        )
        .await
        .unwrap();

        delete_comment(&pool, Uuid::parse_str(&comment.guid).unwrap())
            .await
            .unwrap();

        let markers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM markers")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(markers, 0);
    }
}
