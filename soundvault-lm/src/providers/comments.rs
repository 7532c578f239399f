//! Comment and marker store
//!
//! Keeps the comment list, the marker collection, and the derived
//! region-to-comment lookup mutually consistent. Both in-memory lists are
//! newest-first regardless of how the server orders rows; the lookup is
//! rebuilt from scratch on every fetch and never persisted.

use crate::db::comments as db;
use crate::db::parse_guid;
use crate::playback::PlaybackController;
use serde::Serialize;
use soundvault_common::db::models::{CommentRow, MarkerRow};
use soundvault_common::events::{EventBus, LibraryEvent};
use soundvault_common::Result;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Region fill color applied when a comment is selected
const SELECTED_REGION_COLOR: &str = "rgba(255, 200, 0, 0.4)";

#[derive(Debug, Clone, Serialize)]
pub struct MarkerView {
    pub id: Uuid,
    pub comment_id: Uuid,
    pub track_id: Uuid,
    pub time_seconds: f64,
    pub region_id: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub track_id: Uuid,
    pub content: String,
    pub time_seconds: f64,
    pub marker: Option<MarkerView>,
}

impl CommentView {
    fn from_rows(comment: &CommentRow, marker: Option<&MarkerRow>) -> Result<Self> {
        Ok(Self {
            id: parse_guid(&comment.guid)?,
            track_id: parse_guid(&comment.track_id)?,
            content: comment.content.clone(),
            time_seconds: comment.time_seconds,
            marker: marker.map(|m| MarkerView::from_row(m)).transpose()?,
        })
    }
}

impl MarkerView {
    fn from_row(row: &MarkerRow) -> Result<Self> {
        Ok(Self {
            id: parse_guid(&row.guid)?,
            comment_id: parse_guid(&row.comment_id)?,
            track_id: parse_guid(&row.track_id)?,
            time_seconds: row.time_seconds,
            region_id: row.region_id.clone(),
            color: row.color.clone(),
        })
    }
}

/// Seam to the waveform renderer
///
/// The renderer lives on the UI side and may not be attached; every call
/// site must tolerate its absence.
pub trait RegionRenderer: Send + Sync {
    /// Recolor the visual region correlated with `region_id`
    fn recolor_region(&self, region_id: &str, color: &str);
}

pub struct CommentStore {
    pool: SqlitePool,
    bus: EventBus,
    comments: RwLock<Vec<CommentView>>,
    markers: RwLock<Vec<MarkerView>>,
    /// region id -> comment id, rebuilt on every fetch
    region_map: RwLock<HashMap<String, Uuid>>,
    renderer: RwLock<Option<Arc<dyn RegionRenderer>>>,
}

impl CommentStore {
    pub fn new(pool: SqlitePool, bus: EventBus) -> Self {
        Self {
            pool,
            bus,
            comments: RwLock::new(Vec::new()),
            markers: RwLock::new(Vec::new()),
            region_map: RwLock::new(HashMap::new()),
            renderer: RwLock::new(None),
        }
    }

    /// Attach (or replace) the waveform renderer
    pub async fn attach_renderer(&self, renderer: Arc<dyn RegionRenderer>) {
        *self.renderer.write().await = Some(renderer);
    }

    pub async fn detach_renderer(&self) {
        *self.renderer.write().await = None;
    }

    /// Fetch a track's comments, rebuilding markers and the region lookup
    pub async fn fetch(&self, track_id: Uuid) -> Result<Vec<CommentView>> {
        let rows = db::fetch_comments_with_markers(&self.pool, track_id).await?;

        let mut comments = Vec::with_capacity(rows.len());
        let mut markers = Vec::new();
        let mut region_map = HashMap::new();

        for (comment_row, marker_row) in &rows {
            let view = CommentView::from_rows(comment_row, marker_row.as_ref())?;
            if let Some(marker) = &view.marker {
                if !marker.region_id.is_empty() {
                    region_map.insert(marker.region_id.clone(), view.id);
                }
                markers.push(marker.clone());
            }
            comments.push(view);
        }

        debug!(
            "Fetched {} comments ({} markers) for track {}",
            comments.len(),
            markers.len(),
            track_id
        );

        *self.comments.write().await = comments.clone();
        *self.markers.write().await = markers;
        *self.region_map.write().await = region_map;

        Ok(comments)
    }

    /// Create a comment (optionally with a marker) and prepend it locally
    ///
    /// Newest-first is an invariant of the in-memory lists: the new
    /// comment and marker go to index 0 without a refetch.
    pub async fn add_comment(
        &self,
        track_id: Uuid,
        content: &str,
        time_seconds: f64,
        with_marker: bool,
        color: Option<String>,
    ) -> Result<CommentView> {
        let marker = with_marker.then(|| db::NewMarker {
            time_seconds,
            color,
        });

        let (comment_row, marker_row) =
            db::insert_comment_with_marker(&self.pool, track_id, content, time_seconds, marker)
                .await?;

        let view = CommentView::from_rows(&comment_row, marker_row.as_ref())?;

        self.comments.write().await.insert(0, view.clone());
        if let Some(marker) = &view.marker {
            self.markers.write().await.insert(0, marker.clone());
            if !marker.region_id.is_empty() {
                self.region_map
                    .write()
                    .await
                    .insert(marker.region_id.clone(), view.id);
            }
        }

        self.bus.emit(LibraryEvent::CommentAdded {
            track_id,
            comment_id: view.id,
            has_marker: view.marker.is_some(),
            timestamp: chrono::Utc::now(),
        });

        info!("Added comment {} on track {}", view.id, track_id);
        Ok(view)
    }

    pub async fn delete_comment(&self, comment_id: Uuid) -> Result<bool> {
        let removed = db::delete_comment(&self.pool, comment_id).await?;

        if removed {
            self.comments.write().await.retain(|c| c.id != comment_id);
            let mut markers = self.markers.write().await;
            if let Some(marker) = markers.iter().find(|m| m.comment_id == comment_id) {
                self.region_map.write().await.remove(&marker.region_id);
            }
            markers.retain(|m| m.comment_id != comment_id);
        }

        Ok(removed)
    }

    pub async fn comments(&self) -> Vec<CommentView> {
        self.comments.read().await.clone()
    }

    pub async fn markers(&self) -> Vec<MarkerView> {
        self.markers.read().await.clone()
    }

    pub async fn region_map(&self) -> HashMap<String, Uuid> {
        self.region_map.read().await.clone()
    }

    /// Resolve a region id to its comment id
    pub async fn comment_for_region(&self, region_id: &str) -> Option<Uuid> {
        self.region_map.read().await.get(region_id).copied()
    }

    /// Select a comment: highlight its waveform region and seek playback
    ///
    /// Cross-component side effect, not a pure state update. Tolerates a
    /// missing marker, a missing region entry, and an unattached renderer;
    /// all of those degrade to doing nothing rather than erroring.
    pub async fn select_comment(&self, comment_id: Uuid, playback: &PlaybackController) {
        let marker = {
            let markers = self.markers.read().await;
            markers.iter().find(|m| m.comment_id == comment_id).cloned()
        };

        let Some(marker) = marker else {
            debug!("Comment {} has no marker; selection is a no-op", comment_id);
            return;
        };

        // Confirm the region is still known to the lookup
        if self.comment_for_region(&marker.region_id).await != Some(comment_id) {
            debug!("Region {} not in lookup; selection is a no-op", marker.region_id);
            return;
        }

        if let Some(renderer) = self.renderer.read().await.as_ref() {
            renderer.recolor_region(&marker.region_id, SELECTED_REGION_COLOR);
        }

        playback.seek(marker.time_seconds).await;
    }
}
