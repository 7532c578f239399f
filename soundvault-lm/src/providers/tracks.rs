//! Track provider

use super::TrackView;
use crate::db::tracks::{self, NewTrack};
use soundvault_common::events::{EventBus, LibraryEvent};
use soundvault_common::Result;
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// Owns the in-memory library track collection
pub struct TrackProvider {
    pool: SqlitePool,
    bus: EventBus,
    tracks: RwLock<Vec<TrackView>>,
}

impl TrackProvider {
    pub fn new(pool: SqlitePool, bus: EventBus) -> Self {
        Self {
            pool,
            bus,
            tracks: RwLock::new(Vec::new()),
        }
    }

    /// Fetch all tracks from the store, replacing the local collection
    pub async fn fetch(&self) -> Result<Vec<TrackView>> {
        let rows = tracks::list_tracks(&self.pool).await?;
        let views: Vec<TrackView> = rows
            .iter()
            .map(TrackView::from_row)
            .collect::<Result<_>>()?;

        *self.tracks.write().await = views.clone();
        Ok(views)
    }

    /// Search without touching the owned collection
    pub async fn search(&self, query: &str) -> Result<Vec<TrackView>> {
        let rows = tracks::search_tracks(&self.pool, query).await?;
        rows.iter().map(TrackView::from_row).collect()
    }

    pub async fn current(&self) -> Vec<TrackView> {
        self.tracks.read().await.clone()
    }

    pub async fn create(&self, new: NewTrack) -> Result<TrackView> {
        let row = tracks::insert_track(&self.pool, &new).await?;
        let view = TrackView::from_row(&row)?;

        self.tracks.write().await.push(view.clone());
        self.emit_changed();
        info!("Created track '{}'", view.title);
        Ok(view)
    }

    pub async fn update(
        &self,
        track_id: Uuid,
        title: Option<&str>,
        artist: Option<&str>,
        album: Option<&str>,
    ) -> Result<TrackView> {
        let row = tracks::update_track(&self.pool, track_id, title, artist, album).await?;
        let view = TrackView::from_row(&row)?;

        let mut local = self.tracks.write().await;
        if let Some(existing) = local.iter_mut().find(|t| t.id == track_id) {
            *existing = view.clone();
        }
        drop(local);

        self.emit_changed();
        Ok(view)
    }

    pub async fn delete(&self, track_id: Uuid) -> Result<bool> {
        let removed = tracks::delete_track(&self.pool, track_id).await?;

        if removed {
            self.tracks.write().await.retain(|t| t.id != track_id);
            self.emit_changed();
            info!("Deleted track {}", track_id);
        }

        Ok(removed)
    }

    fn emit_changed(&self) {
        self.bus.emit(LibraryEvent::TrackListChanged {
            timestamp: chrono::Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soundvault_common::db::init::init_memory_database;

    fn sample(title: &str, path: &str) -> NewTrack {
        NewTrack {
            title: title.to_string(),
            artist: None,
            album: None,
            duration_seconds: None,
            file_path: path.to_string(),
        }
    }

    #[tokio::test]
    async fn create_appears_in_local_collection_and_fetch() {
        let pool = init_memory_database().await.unwrap();
        let provider = TrackProvider::new(pool, EventBus::default());

        provider.create(sample("One", "/m/1.mp3")).await.unwrap();
        assert_eq!(provider.current().await.len(), 1);

        let fetched = provider.fetch().await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert!(fetched[0].playlist_track_id.is_none());
    }

    #[tokio::test]
    async fn delete_removes_from_local_collection() {
        let pool = init_memory_database().await.unwrap();
        let provider = TrackProvider::new(pool, EventBus::default());

        let track = provider.create(sample("One", "/m/1.mp3")).await.unwrap();
        assert!(provider.delete(track.id).await.unwrap());
        assert!(provider.current().await.is_empty());
    }
}
