//! Playback controller
//!
//! Owns "what is playing" independent of any UI: current track, playing
//! flag, playback mode, and next/previous navigation over the visible
//! track list. Decoding and audio output are delegated to the platform
//! player; this controller only decides which track comes next.

use crate::providers::TrackView;
use rand::Rng;
use serde::{Deserialize, Serialize};
use soundvault_common::events::{EventBus, LibraryEvent};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    Normal,
    RepeatOne,
    RepeatAll,
    Shuffle,
}

pub struct PlaybackController {
    current: RwLock<Option<TrackView>>,
    playing: RwLock<bool>,
    mode: RwLock<PlayMode>,
    position_seconds: RwLock<f64>,
    bus: EventBus,
}

impl PlaybackController {
    pub fn new(bus: EventBus) -> Self {
        Self {
            current: RwLock::new(None),
            playing: RwLock::new(false),
            mode: RwLock::new(PlayMode::Normal),
            position_seconds: RwLock::new(0.0),
            bus,
        }
    }

    pub async fn current(&self) -> Option<TrackView> {
        self.current.read().await.clone()
    }

    pub async fn is_playing(&self) -> bool {
        *self.playing.read().await
    }

    pub async fn mode(&self) -> PlayMode {
        *self.mode.read().await
    }

    pub async fn set_mode(&self, mode: PlayMode) {
        *self.mode.write().await = mode;
    }

    pub async fn position(&self) -> f64 {
        *self.position_seconds.read().await
    }

    pub async fn seek(&self, seconds: f64) {
        let clamped = seconds.max(0.0);
        *self.position_seconds.write().await = clamped;
        debug!("Seek to {:.2}s", clamped);
    }

    /// Start playing a track from the beginning
    pub async fn play(&self, track: TrackView) {
        *self.current.write().await = Some(track);
        *self.playing.write().await = true;
        *self.position_seconds.write().await = 0.0;
        self.emit_changed().await;
    }

    pub async fn pause(&self) {
        *self.playing.write().await = false;
        self.emit_changed().await;
    }

    pub async fn resume(&self) {
        if self.current.read().await.is_some() {
            *self.playing.write().await = true;
            self.emit_changed().await;
        }
    }

    /// Advance to the next track given the visible listing
    ///
    /// Mode rules: Normal stops at the end of the list; RepeatOne restarts
    /// the same track; RepeatAll wraps; Shuffle picks a random other index
    /// (or the same one when the list has a single entry).
    pub async fn next(&self, listing: &[TrackView]) {
        if listing.is_empty() {
            return;
        }

        let mode = *self.mode.read().await;
        let current_index = self.current_index(listing).await;

        let next = match mode {
            PlayMode::RepeatOne => current_index,
            PlayMode::Shuffle => Some(self.shuffle_index(listing.len(), current_index)),
            PlayMode::Normal => match current_index {
                Some(i) if i + 1 < listing.len() => Some(i + 1),
                Some(_) => None, // end of list
                None => Some(0),
            },
            PlayMode::RepeatAll => match current_index {
                Some(i) => Some((i + 1) % listing.len()),
                None => Some(0),
            },
        };

        match next {
            Some(index) => self.play(listing[index].clone()).await,
            None => {
                *self.playing.write().await = false;
                self.emit_changed().await;
            }
        }
    }

    /// Step back to the previous track given the visible listing
    pub async fn previous(&self, listing: &[TrackView]) {
        if listing.is_empty() {
            return;
        }

        let mode = *self.mode.read().await;
        let current_index = self.current_index(listing).await;

        let prev = match mode {
            PlayMode::RepeatOne => current_index,
            PlayMode::Shuffle => Some(self.shuffle_index(listing.len(), current_index)),
            PlayMode::Normal => match current_index {
                Some(i) if i > 0 => Some(i - 1),
                Some(i) => Some(i), // stay on first
                None => Some(0),
            },
            PlayMode::RepeatAll => match current_index {
                Some(0) => Some(listing.len() - 1),
                Some(i) => Some(i - 1),
                None => Some(0),
            },
        };

        if let Some(index) = prev {
            self.play(listing[index].clone()).await;
        }
    }

    async fn current_index(&self, listing: &[TrackView]) -> Option<usize> {
        let current = self.current.read().await;
        let current = current.as_ref()?;
        // Match by membership id when in a playlist listing so duplicate
        // tracks resolve to the right occurrence
        if let Some(membership) = current.playlist_track_id {
            if let Some(i) = listing
                .iter()
                .position(|t| t.playlist_track_id == Some(membership))
            {
                return Some(i);
            }
        }
        listing.iter().position(|t| t.id == current.id)
    }

    fn shuffle_index(&self, len: usize, current: Option<usize>) -> usize {
        if len == 1 {
            return 0;
        }
        let mut rng = rand::thread_rng();
        loop {
            let candidate = rng.gen_range(0..len);
            if Some(candidate) != current {
                return candidate;
            }
        }
    }

    async fn emit_changed(&self) {
        let current = self.current.read().await;
        self.bus.emit(LibraryEvent::PlaybackChanged {
            track_id: current.as_ref().map(|t| t.id),
            playing: *self.playing.read().await,
            timestamp: chrono::Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn track(title: &str) -> TrackView {
        TrackView {
            id: Uuid::new_v4(),
            title: title.to_string(),
            artist: None,
            album: None,
            duration_seconds: Some(120.0),
            file_path: format!("/m/{}.mp3", title),
            playlist_track_id: None,
        }
    }

    fn listing() -> Vec<TrackView> {
        vec![track("a"), track("b"), track("c")]
    }

    #[tokio::test]
    async fn normal_mode_stops_at_end() {
        let controller = PlaybackController::new(EventBus::default());
        let tracks = listing();

        controller.play(tracks[2].clone()).await;
        controller.next(&tracks).await;

        assert!(!controller.is_playing().await);
        // Current track unchanged
        assert_eq!(controller.current().await.unwrap().id, tracks[2].id);
    }

    #[tokio::test]
    async fn repeat_all_wraps() {
        let controller = PlaybackController::new(EventBus::default());
        let tracks = listing();
        controller.set_mode(PlayMode::RepeatAll).await;

        controller.play(tracks[2].clone()).await;
        controller.next(&tracks).await;
        assert_eq!(controller.current().await.unwrap().id, tracks[0].id);

        controller.previous(&tracks).await;
        assert_eq!(controller.current().await.unwrap().id, tracks[2].id);
    }

    #[tokio::test]
    async fn repeat_one_restarts_same_track() {
        let controller = PlaybackController::new(EventBus::default());
        let tracks = listing();
        controller.set_mode(PlayMode::RepeatOne).await;

        controller.play(tracks[1].clone()).await;
        controller.seek(30.0).await;
        controller.next(&tracks).await;

        assert_eq!(controller.current().await.unwrap().id, tracks[1].id);
        // play() resets position
        assert_eq!(controller.position().await, 0.0);
    }

    #[tokio::test]
    async fn shuffle_picks_a_different_track() {
        let controller = PlaybackController::new(EventBus::default());
        let tracks = listing();
        controller.set_mode(PlayMode::Shuffle).await;

        controller.play(tracks[0].clone()).await;
        controller.next(&tracks).await;
        assert_ne!(controller.current().await.unwrap().id, tracks[0].id);
    }

    #[tokio::test]
    async fn seek_clamps_negative_to_zero() {
        let controller = PlaybackController::new(EventBus::default());
        controller.seek(-5.0).await;
        assert_eq!(controller.position().await, 0.0);
    }
}
