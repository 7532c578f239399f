//! Track clipboard
//!
//! Copy/paste path for moving tracks between playlists without a drag
//! gesture. Paste follows the same batch policy as cross-playlist drag:
//! duplicates allowed, per-item failures tallied, batch never aborted.

use crate::providers::TrackView;
use crate::state::{SharedState, STATUS_CLEAR};
use soundvault_common::api::types::AddReport;
use soundvault_common::events::{EventBus, LibraryEvent};
use soundvault_common::Result;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

pub struct TrackClipboard {
    pool: SqlitePool,
    state: Arc<SharedState>,
    bus: EventBus,
    contents: RwLock<Vec<TrackView>>,
}

impl TrackClipboard {
    pub fn new(pool: SqlitePool, state: Arc<SharedState>, bus: EventBus) -> Self {
        Self {
            pool,
            state,
            bus,
            contents: RwLock::new(Vec::new()),
        }
    }

    pub async fn contents(&self) -> Vec<TrackView> {
        self.contents.read().await.clone()
    }

    pub async fn is_empty(&self) -> bool {
        self.contents.read().await.is_empty()
    }

    /// Replace the clipboard with the given selection
    pub async fn copy(&self, tracks: Vec<TrackView>) {
        let count = tracks.len();
        *self.contents.write().await = tracks;
        self.state
            .set_transient_status(format!("Copied {} tracks", count), false, STATUS_CLEAR)
            .await;
    }

    /// Append the clipboard contents to a playlist
    ///
    /// The clipboard is not consumed; the same selection can be pasted
    /// into several playlists. Adds run sequentially so a partial
    /// completion is a prefix of the clipboard order.
    pub async fn paste_into(&self, playlist_id: Uuid) -> Result<AddReport> {
        crate::db::playlists::get_playlist(&self.pool, playlist_id).await?;

        let tracks = self.contents.read().await.clone();
        let mut report = AddReport::default();
        for track in &tracks {
            match crate::db::playlists::add_membership(&self.pool, playlist_id, track.id, true)
                .await
            {
                Ok(_) => report.record_success(),
                Err(e) => {
                    warn!("Paste of track {} into {} failed: {}", track.id, playlist_id, e);
                    report.record_failure(format!("{}: {}", track.title, e));
                }
            }
        }

        self.bus.emit(LibraryEvent::TracksAddedToPlaylist {
            playlist_id,
            successful: report.successful,
            failed: report.failed,
            timestamp: chrono::Utc::now(),
        });

        let message = if report.failed == 0 {
            format!("Pasted {} tracks", report.successful)
        } else {
            format!("Pasted {} of {} tracks", report.successful, report.total())
        };
        self.state
            .set_transient_status(message, report.failed > 0, STATUS_CLEAR)
            .await;

        info!(
            "Pasted {} tracks into {} ({} failed)",
            report.successful, playlist_id, report.failed
        );
        Ok(report)
    }
}
