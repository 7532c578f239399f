//! Playlist provider
//!
//! Owns two collections: the playlist list itself, and the track listing
//! of the currently open playlist. The reorder coordinator mutates both
//! optimistically through the exposed locks.

use super::{PlaylistView, TrackView};
use crate::db::playlists as db;
use soundvault_common::events::{EventBus, LibraryEvent};
use soundvault_common::{Error, Result};
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

pub struct PlaylistProvider {
    pool: SqlitePool,
    bus: EventBus,
    /// All playlists in display order
    pub playlists: RwLock<Vec<PlaylistView>>,
    /// Track listing of the currently open playlist, in position order
    pub current_tracks: RwLock<Vec<TrackView>>,
}

impl PlaylistProvider {
    pub fn new(pool: SqlitePool, bus: EventBus) -> Self {
        Self {
            pool,
            bus,
            playlists: RwLock::new(Vec::new()),
            current_tracks: RwLock::new(Vec::new()),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Fetch all playlists from the store, replacing the local collection
    pub async fn fetch(&self) -> Result<Vec<PlaylistView>> {
        let rows = db::list_playlists(&self.pool).await?;
        let views: Vec<PlaylistView> = rows
            .iter()
            .map(PlaylistView::from_row)
            .collect::<Result<_>>()?;

        *self.playlists.write().await = views.clone();
        Ok(views)
    }

    pub async fn current(&self) -> Vec<PlaylistView> {
        self.playlists.read().await.clone()
    }

    pub async fn create(&self, name: &str, description: Option<&str>) -> Result<PlaylistView> {
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("Playlist name cannot be empty".to_string()));
        }

        let row = db::insert_playlist(&self.pool, name, description).await?;
        let view = PlaylistView::from_row(&row)?;

        self.playlists.write().await.push(view.clone());
        self.emit_changed();
        info!("Created playlist '{}'", name);
        Ok(view)
    }

    pub async fn update(
        &self,
        playlist_id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<PlaylistView> {
        let row = db::update_playlist(&self.pool, playlist_id, name, description).await?;
        let view = PlaylistView::from_row(&row)?;

        let mut local = self.playlists.write().await;
        if let Some(existing) = local.iter_mut().find(|p| p.id == playlist_id) {
            *existing = view.clone();
        }
        drop(local);

        self.emit_changed();
        Ok(view)
    }

    pub async fn delete(&self, playlist_id: Uuid) -> Result<bool> {
        let removed = db::delete_playlist(&self.pool, playlist_id).await?;

        if removed {
            self.playlists.write().await.retain(|p| p.id != playlist_id);
            self.emit_changed();
            info!("Deleted playlist {}", playlist_id);
        }

        Ok(removed)
    }

    fn emit_changed(&self) {
        self.bus.emit(LibraryEvent::PlaylistListChanged {
            timestamp: chrono::Utc::now(),
        });
    }

    /// Load a playlist's track listing from the store into `current_tracks`
    ///
    /// This is the authoritative refetch used both when opening a playlist
    /// and when rolling back a failed optimistic reorder.
    pub async fn load_tracks(&self, playlist_id: Uuid) -> Result<Vec<TrackView>> {
        let rows = db::list_playlist_tracks(&self.pool, playlist_id).await?;
        let views: Vec<TrackView> = rows
            .iter()
            .map(|(membership, track)| TrackView::from_membership(membership, track))
            .collect::<Result<_>>()?;

        *self.current_tracks.write().await = views.clone();
        Ok(views)
    }

    pub async fn tracks_snapshot(&self) -> Vec<TrackView> {
        self.current_tracks.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::playlists::add_membership;
    use crate::db::tracks::{insert_track, NewTrack};
    use soundvault_common::db::init::init_memory_database;

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let pool = init_memory_database().await.unwrap();
        let provider = PlaylistProvider::new(pool, EventBus::default());

        let result = provider.create("   ", None).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn load_tracks_sets_membership_ids() {
        let pool = init_memory_database().await.unwrap();
        let provider = PlaylistProvider::new(pool.clone(), EventBus::default());

        let playlist = provider.create("Mix", None).await.unwrap();
        let track = insert_track(
            &pool,
            &NewTrack {
                title: "Song".to_string(),
                artist: None,
                album: None,
                duration_seconds: None,
                file_path: "/m/s.mp3".to_string(),
            },
        )
        .await
        .unwrap();
        let track_id = Uuid::parse_str(&track.guid).unwrap();
        add_membership(&pool, playlist.id, track_id, true).await.unwrap();

        let listing = provider.load_tracks(playlist.id).await.unwrap();
        assert_eq!(listing.len(), 1);
        assert!(listing[0].playlist_track_id.is_some());
        assert_eq!(provider.tracks_snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn create_and_delete_notify_subscribers() {
        let pool = init_memory_database().await.unwrap();
        let bus = EventBus::default();
        let provider = PlaylistProvider::new(pool, bus.clone());
        let mut rx = bus.subscribe();

        let playlist = provider.create("Mix", None).await.unwrap();
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, LibraryEvent::PlaylistListChanged { .. }));

        provider.delete(playlist.id).await.unwrap();
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, LibraryEvent::PlaylistListChanged { .. }));
    }
}
