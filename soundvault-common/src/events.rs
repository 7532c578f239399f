//! Event types for the Soundvault event system
//!
//! Events are broadcast over a tokio broadcast channel and serialized for
//! SSE transmission to connected local UIs.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Library mutation and playback events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LibraryEvent {
    /// The track collection changed (create/update/delete)
    TrackListChanged {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The playlist collection changed (create/update/delete)
    PlaylistListChanged {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The playlist collection order changed
    PlaylistsReordered {
        playlist_ids: Vec<Uuid>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Tracks inside one playlist were reordered
    PlaylistTracksReordered {
        playlist_id: Uuid,
        membership_ids: Vec<Uuid>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Tracks were added to a playlist (drag-drop or paste)
    TracksAddedToPlaylist {
        playlist_id: Uuid,
        successful: usize,
        failed: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A comment (and optionally its marker) was created
    CommentAdded {
        track_id: Uuid,
        comment_id: Uuid,
        has_marker: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback started, paused, or moved to another track
    PlaybackChanged {
        track_id: Option<Uuid>,
        playing: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Transient user-facing status message
    StatusMessage {
        message: String,
        is_error: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// Broadcast bus for library events
///
/// Send errors are ignored: no subscribers is a normal condition.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<LibraryEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn emit(&self, event: LibraryEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LibraryEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emit_reaches_subscriber() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.emit(LibraryEvent::TrackListChanged {
            timestamp: chrono::Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, LibraryEvent::TrackListChanged { .. }));
    }

    #[test]
    fn emit_without_subscribers_is_ok() {
        let bus = EventBus::new(8);
        bus.emit(LibraryEvent::TrackListChanged {
            timestamp: chrono::Utc::now(),
        });
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = LibraryEvent::StatusMessage {
            message: "Copied 3 tracks".to_string(),
            is_error: false,
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"StatusMessage\""));
    }
}
