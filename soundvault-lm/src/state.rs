//! Shared view state
//!
//! Owns what the UI is currently looking at (library vs playlist view,
//! selected playlist, sort mode, search filter) and the transient status
//! message line. Handed to the reorder coordinator and providers by
//! reference; there is no ambient/global lookup.

use serde::{Deserialize, Serialize};
use soundvault_common::events::{EventBus, LibraryEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// How long transient status messages stay visible before auto-clearing
pub const STATUS_CLEAR: Duration = Duration::from_millis(2500);

/// Which collection the track table is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Library,
    Playlist,
}

/// Active sort for the track table
///
/// Only `Manual` permits drag-to-reorder; attribute sorts display a
/// derived order that cannot be persisted positionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    Manual,
    Title,
    Artist,
    Album,
    Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewState {
    pub mode: ViewMode,
    pub selected_playlist: Option<Uuid>,
    pub sort: SortMode,
    pub filter: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            mode: ViewMode::Library,
            selected_playlist: None,
            sort: SortMode::Manual,
            filter: None,
        }
    }
}

/// Transient status line shown to the user
#[derive(Debug, Clone, Serialize)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// State shared across handlers and the reorder coordinator
pub struct SharedState {
    view: RwLock<ViewState>,
    status: RwLock<Option<StatusMessage>>,
    /// Incremented on every status set; lets the delayed clear task detect
    /// that a newer message replaced the one it was scheduled to clear.
    status_generation: AtomicU64,
    bus: EventBus,
}

impl SharedState {
    pub fn new(bus: EventBus) -> Self {
        Self {
            view: RwLock::new(ViewState::default()),
            status: RwLock::new(None),
            status_generation: AtomicU64::new(0),
            bus,
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub async fn view(&self) -> ViewState {
        self.view.read().await.clone()
    }

    pub async fn set_view_mode(&self, mode: ViewMode) {
        self.view.write().await.mode = mode;
    }

    pub async fn set_sort(&self, sort: SortMode) {
        self.view.write().await.sort = sort;
    }

    pub async fn set_filter(&self, filter: Option<String>) {
        self.view.write().await.filter = filter;
    }

    /// Select a playlist and switch to playlist view
    pub async fn select_playlist(&self, playlist_id: Uuid) {
        let mut view = self.view.write().await;
        view.selected_playlist = Some(playlist_id);
        view.mode = ViewMode::Playlist;
    }

    /// Clear selection if it points at the given playlist
    ///
    /// Called when a playlist is deleted so the view does not keep a
    /// dangling reference.
    pub async fn clear_selection_if(&self, playlist_id: Uuid) {
        let mut view = self.view.write().await;
        if view.selected_playlist == Some(playlist_id) {
            view.selected_playlist = None;
            view.mode = ViewMode::Library;
        }
    }

    pub async fn status(&self) -> Option<StatusMessage> {
        self.status.read().await.clone()
    }

    /// Show a status message and schedule it to clear after `clear_after`
    ///
    /// Non-blocking: the clear runs on a spawned task and backs off if a
    /// newer message has replaced this one in the meantime.
    pub async fn set_transient_status(
        self: &Arc<Self>,
        text: impl Into<String>,
        is_error: bool,
        clear_after: Duration,
    ) {
        let message = StatusMessage { text: text.into(), is_error };

        let generation = self.status_generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.status.write().await = Some(message.clone());

        self.bus.emit(LibraryEvent::StatusMessage {
            message: message.text.clone(),
            is_error,
            timestamp: chrono::Utc::now(),
        });

        let state = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(clear_after).await;
            if state.status_generation.load(Ordering::SeqCst) == generation {
                *state.status.write().await = None;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn selecting_playlist_switches_view() {
        let state = SharedState::new(EventBus::default());
        let playlist = Uuid::new_v4();

        state.select_playlist(playlist).await;
        let view = state.view().await;
        assert_eq!(view.mode, ViewMode::Playlist);
        assert_eq!(view.selected_playlist, Some(playlist));
    }

    #[tokio::test]
    async fn deleting_selected_playlist_clears_selection() {
        let state = SharedState::new(EventBus::default());
        let playlist = Uuid::new_v4();
        state.select_playlist(playlist).await;

        state.clear_selection_if(playlist).await;
        let view = state.view().await;
        assert_eq!(view.selected_playlist, None);
        assert_eq!(view.mode, ViewMode::Library);
    }

    #[tokio::test]
    async fn clearing_other_playlist_keeps_selection() {
        let state = SharedState::new(EventBus::default());
        let playlist = Uuid::new_v4();
        state.select_playlist(playlist).await;

        state.clear_selection_if(Uuid::new_v4()).await;
        assert_eq!(state.view().await.selected_playlist, Some(playlist));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_status_clears_after_delay() {
        let state = Arc::new(SharedState::new(EventBus::default()));

        state
            .set_transient_status("Pasted 2 tracks", false, Duration::from_millis(2500))
            .await;
        assert!(state.status().await.is_some());

        tokio::time::sleep(Duration::from_millis(2600)).await;
        tokio::task::yield_now().await;
        assert!(state.status().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn newer_status_survives_older_clear() {
        let state = Arc::new(SharedState::new(EventBus::default()));

        state
            .set_transient_status("first", false, Duration::from_millis(100))
            .await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        state
            .set_transient_status("second", false, Duration::from_millis(2500))
            .await;

        // First message's clear fires here but must not wipe the second
        tokio::time::sleep(Duration::from_millis(100)).await;
        tokio::task::yield_now().await;
        let status = state.status().await.unwrap();
        assert_eq!(status.text, "second");
    }
}
