//! Reorder coordinator
//!
//! Executes classified drag intents with optimistic-update semantics.
//! One operation runs at a time: a gesture completing while another
//! reorder is in flight is dropped, not queued, so the only ordering
//! guarantee between rapid gestures is "last accepted wins".
//!
//! Failure policies differ by operation:
//! - intra-playlist reorder: rollback by refetching the authoritative
//!   order from the store
//! - playlist-list reorder: all-or-nothing write, no automatic rollback
//!   of the optimistic local state
//! - cross-playlist move: per-item tally, the batch never aborts

use crate::providers::playlists::PlaylistProvider;
use crate::providers::TrackView;
use crate::reorder::commit::{BatchPolicy, OptimisticCommit};
use crate::reorder::intent::{array_move, DragIntent};
use crate::state::{SharedState, SortMode, ViewMode, STATUS_CLEAR};
use soundvault_common::api::types::AddReport;
use soundvault_common::events::{EventBus, LibraryEvent};
use soundvault_common::{Error, Result};
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Lifecycle of a single reorder operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderPhase {
    Idle,
    Validating,
    Applying,
    Persisting,
    Confirmed,
    RolledBack,
}

/// Result of dispatching a drag intent
#[derive(Debug)]
pub enum DispatchOutcome {
    TracksReordered,
    PlaylistsReordered,
    Moved(AddReport),
    /// Dropped without side effects (no-op gesture, duplicate callback,
    /// or another operation in flight)
    Ignored(&'static str),
}

pub struct ReorderCoordinator {
    pool: SqlitePool,
    state: Arc<SharedState>,
    playlists: Arc<PlaylistProvider>,
    bus: EventBus,
    /// Single-flight guard: at most one reorder in Validating..Persisting
    in_flight: AtomicBool,
    /// Last accepted gesture, for the duplicate-callback debounce
    last_gesture: Mutex<Option<(usize, usize, Instant)>>,
    debounce: Duration,
    phase: Mutex<ReorderPhase>,
}

impl ReorderCoordinator {
    pub fn new(
        pool: SqlitePool,
        state: Arc<SharedState>,
        playlists: Arc<PlaylistProvider>,
        bus: EventBus,
    ) -> Self {
        Self::with_debounce(pool, state, playlists, bus, Duration::from_secs(1))
    }

    pub fn with_debounce(
        pool: SqlitePool,
        state: Arc<SharedState>,
        playlists: Arc<PlaylistProvider>,
        bus: EventBus,
        debounce: Duration,
    ) -> Self {
        Self {
            pool,
            state,
            playlists,
            bus,
            in_flight: AtomicBool::new(false),
            last_gesture: Mutex::new(None),
            debounce,
            phase: Mutex::new(ReorderPhase::Idle),
        }
    }

    /// Current operation phase, for diagnostics
    pub fn phase(&self) -> ReorderPhase {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_phase(&self, phase: ReorderPhase) {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner()) = phase;
    }

    /// Execute a classified drag intent
    pub async fn dispatch(&self, intent: DragIntent) -> Result<DispatchOutcome> {
        match intent {
            DragIntent::ReorderTracks { start_index, end_index } => {
                self.reorder_tracks(start_index, end_index).await
            }
            DragIntent::ReorderPlaylists { start_index, end_index } => {
                self.reorder_playlists(start_index, end_index).await
            }
            DragIntent::MoveToPlaylist { track_ids, target_playlist } => {
                let report = self.move_to_playlist(&track_ids, target_playlist).await?;
                Ok(DispatchOutcome::Moved(report))
            }
            DragIntent::NoOp => Ok(DispatchOutcome::Ignored("nothing to do")),
        }
    }

    /// Reorder tracks within the open playlist
    ///
    /// Indices are into the currently displayed listing. Validation
    /// failures reject before any state mutation and make no network
    /// call; persistence failure rolls the listing back to a fresh
    /// authoritative fetch.
    pub async fn reorder_tracks(
        &self,
        start_index: usize,
        end_index: usize,
    ) -> Result<DispatchOutcome> {
        let Some(_flight) = self.try_begin() else {
            debug!("Dropping reorder ({} -> {}): another operation in flight", start_index, end_index);
            return Ok(DispatchOutcome::Ignored("another reorder is in flight"));
        };

        self.set_phase(ReorderPhase::Validating);

        let view = self.state.view().await;
        if view.mode != ViewMode::Playlist {
            self.set_phase(ReorderPhase::Idle);
            return Err(Error::InvalidInput(
                "Track reordering requires the playlist view".to_string(),
            ));
        }
        let Some(playlist_id) = view.selected_playlist else {
            self.set_phase(ReorderPhase::Idle);
            return Err(Error::InvalidInput("No playlist selected".to_string()));
        };
        if view.sort != SortMode::Manual {
            self.set_phase(ReorderPhase::Idle);
            return Err(Error::InvalidInput(
                "Reordering requires manual order mode".to_string(),
            ));
        }

        // Gesture libraries fire duplicate end callbacks; absorb repeats
        // of the same index pair inside the debounce window
        if self.is_duplicate_gesture(start_index, end_index) {
            self.set_phase(ReorderPhase::Idle);
            debug!("Dropping duplicate reorder gesture ({} -> {})", start_index, end_index);
            return Ok(DispatchOutcome::Ignored("duplicate gesture"));
        }

        let mut tracks = self.playlists.current_tracks.write().await;
        let len = tracks.len();
        if start_index >= len || end_index >= len {
            self.set_phase(ReorderPhase::Idle);
            return Err(Error::InvalidInput(format!(
                "Reorder index out of range ({} -> {} in {} tracks)",
                start_index, end_index, len
            )));
        }
        if start_index == end_index {
            self.set_phase(ReorderPhase::Idle);
            return Ok(DispatchOutcome::Ignored("no-op reorder"));
        }

        let mut new_order = tracks.clone();
        array_move(&mut new_order, start_index, end_index);

        let ordered_ids: Vec<Uuid> = match new_order
            .iter()
            .map(|t| {
                t.playlist_track_id.ok_or_else(|| {
                    Error::Internal("Playlist listing is missing membership ids".to_string())
                })
            })
            .collect::<Result<_>>()
        {
            Ok(ids) => ids,
            Err(e) => {
                self.set_phase(ReorderPhase::Idle);
                return Err(e);
            }
        };

        self.remember_gesture(start_index, end_index);

        // Optimistic: the new order is visible before the server confirms
        self.set_phase(ReorderPhase::Applying);
        let handle = OptimisticCommit::apply(&mut tracks, new_order, BatchPolicy::PerItemTolerant);
        drop(tracks);

        self.set_phase(ReorderPhase::Persisting);
        let write = crate::db::playlists::update_track_order(&self.pool, playlist_id, &ordered_ids).await;

        // Zero updated rows means the listing went stale under us; that is
        // a failed write even though the SQL succeeded
        let failure = match write {
            Ok(0) => Some(Error::WriteRejected(
                "Server applied no rows for the new order".to_string(),
            )),
            Ok(changes) => {
                debug!("Reorder persisted: {} rows updated", changes);
                None
            }
            Err(e) => Some(e),
        };

        match failure {
            None => {
                handle.confirm();
                self.set_phase(ReorderPhase::Confirmed);
                self.bus.emit(LibraryEvent::PlaylistTracksReordered {
                    playlist_id,
                    membership_ids: ordered_ids,
                    timestamp: chrono::Utc::now(),
                });
                info!(
                    "Reordered playlist {} tracks ({} -> {})",
                    playlist_id, start_index, end_index
                );
                self.set_phase(ReorderPhase::Idle);
                Ok(DispatchOutcome::TracksReordered)
            }
            Some(e) => {
                warn!("Reorder persist failed, rolling back: {}", e);
                self.set_phase(ReorderPhase::RolledBack);

                // Authoritative refetch overwrites the optimistic order;
                // fall back to the pre-drag state if the refetch fails too
                let fresh = self.fetch_fresh_listing(playlist_id).await;
                let mut tracks = self.playlists.current_tracks.write().await;
                handle.resolve_failure(&mut tracks, fresh);
                drop(tracks);

                self.state
                    .set_transient_status(format!("Reorder failed: {}", e), true, STATUS_CLEAR)
                    .await;
                self.set_phase(ReorderPhase::Idle);
                Err(e)
            }
        }
    }

    /// Reorder the playlist list itself
    ///
    /// Structurally the same optimistic flow as track reordering, but the
    /// write is all-or-nothing (any id updating zero rows fails the whole
    /// batch) and a failure does not roll the local order back.
    pub async fn reorder_playlists(
        &self,
        start_index: usize,
        end_index: usize,
    ) -> Result<DispatchOutcome> {
        let Some(_flight) = self.try_begin() else {
            debug!("Dropping playlist reorder: another operation in flight");
            return Ok(DispatchOutcome::Ignored("another reorder is in flight"));
        };

        self.set_phase(ReorderPhase::Validating);

        let mut playlists = self.playlists.playlists.write().await;
        let len = playlists.len();
        if start_index >= len || end_index >= len {
            self.set_phase(ReorderPhase::Idle);
            return Err(Error::InvalidInput(format!(
                "Reorder index out of range ({} -> {} in {} playlists)",
                start_index, end_index, len
            )));
        }
        if start_index == end_index {
            self.set_phase(ReorderPhase::Idle);
            return Ok(DispatchOutcome::Ignored("no-op reorder"));
        }

        let mut new_order = playlists.clone();
        array_move(&mut new_order, start_index, end_index);
        let ordered_ids: Vec<Uuid> = new_order.iter().map(|p| p.id).collect();

        self.set_phase(ReorderPhase::Applying);
        let handle = OptimisticCommit::apply(&mut playlists, new_order, BatchPolicy::AllOrNothing);
        drop(playlists);

        self.set_phase(ReorderPhase::Persisting);
        match crate::db::playlists::update_playlist_order(&self.pool, &ordered_ids).await {
            Ok(()) => {
                handle.confirm();
                self.set_phase(ReorderPhase::Confirmed);
                self.bus.emit(LibraryEvent::PlaylistsReordered {
                    playlist_ids: ordered_ids,
                    timestamp: chrono::Utc::now(),
                });
                info!("Reordered playlists ({} -> {})", start_index, end_index);
                self.set_phase(ReorderPhase::Idle);
                Ok(DispatchOutcome::PlaylistsReordered)
            }
            Err(e) => {
                // All-or-nothing write persisted nothing; the optimistic
                // order stays on screen and the user repeats the gesture
                // once the stale entry is gone
                warn!("Playlist order persist failed (local order kept): {}", e);
                let mut playlists = self.playlists.playlists.write().await;
                handle.resolve_failure(&mut playlists, None);
                drop(playlists);
                self.state
                    .set_transient_status(
                        format!("Playlist order not saved: {}", e),
                        true,
                        STATUS_CLEAR,
                    )
                    .await;
                self.set_phase(ReorderPhase::Idle);
                Err(e)
            }
        }
    }

    /// Add tracks to another playlist (cross-playlist drag)
    ///
    /// Duplicates are allowed on this path. Adds run sequentially so a
    /// partial completion is always a prefix of the requested list.
    /// Per-item failures are tallied, never aborting the batch.
    pub async fn move_to_playlist(
        &self,
        track_ids: &[Uuid],
        target_playlist: Uuid,
    ) -> Result<AddReport> {
        // Target must exist; this is a validation failure, not a tally entry
        crate::db::playlists::get_playlist(&self.pool, target_playlist).await?;

        let mut report = AddReport::default();
        for track_id in track_ids {
            match crate::db::playlists::add_membership(&self.pool, target_playlist, *track_id, true)
                .await
            {
                Ok(_) => report.record_success(),
                Err(e) => {
                    warn!("Failed to add track {} to playlist {}: {}", track_id, target_playlist, e);
                    report.record_failure(format!("{}: {}", track_id, e));
                }
            }
        }

        self.bus.emit(LibraryEvent::TracksAddedToPlaylist {
            playlist_id: target_playlist,
            successful: report.successful,
            failed: report.failed,
            timestamp: chrono::Utc::now(),
        });

        let message = if report.failed == 0 {
            format!("Added {} tracks", report.successful)
        } else {
            format!("Added {} of {} tracks", report.successful, report.total())
        };
        self.state
            .set_transient_status(message, report.failed > 0, STATUS_CLEAR)
            .await;

        info!(
            "Cross-playlist add to {}: {} ok, {} failed",
            target_playlist, report.successful, report.failed
        );
        Ok(report)
    }

    fn try_begin(&self) -> Option<FlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| FlightGuard(&self.in_flight))
    }

    fn is_duplicate_gesture(&self, start_index: usize, end_index: usize) -> bool {
        let last = self.last_gesture.lock().unwrap_or_else(|e| e.into_inner());
        matches!(
            *last,
            Some((s, e, at)) if s == start_index && e == end_index && at.elapsed() < self.debounce
        )
    }

    fn remember_gesture(&self, start_index: usize, end_index: usize) {
        let mut last = self.last_gesture.lock().unwrap_or_else(|e| e.into_inner());
        *last = Some((start_index, end_index, Instant::now()));
    }

    async fn fetch_fresh_listing(&self, playlist_id: Uuid) -> Option<Vec<TrackView>> {
        let rows = crate::db::playlists::list_playlist_tracks(&self.pool, playlist_id)
            .await
            .ok()?;
        rows.iter()
            .map(|(membership, track)| TrackView::from_membership(membership, track))
            .collect::<Result<Vec<_>>>()
            .ok()
    }
}

/// Clears the in-flight flag on every exit path
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::playlists::{add_membership, insert_playlist, list_playlist_tracks};
    use crate::db::tracks::{insert_track, NewTrack};
    use soundvault_common::db::init::init_memory_database;

    struct Fixture {
        pool: SqlitePool,
        state: Arc<SharedState>,
        playlists: Arc<PlaylistProvider>,
        coordinator: ReorderCoordinator,
        bus: EventBus,
        playlist_id: Uuid,
        track_ids: Vec<Uuid>,
    }

    /// Playlist "Mix" seeded with tracks A, B, C at positions 0, 1, 2,
    /// selected in playlist view with manual sort
    async fn fixture(titles: &[&str]) -> Fixture {
        let pool = init_memory_database().await.unwrap();
        let bus = EventBus::default();
        let state = Arc::new(SharedState::new(bus.clone()));
        let playlists = Arc::new(PlaylistProvider::new(pool.clone(), bus.clone()));

        let playlist = insert_playlist(&pool, "Mix", None).await.unwrap();
        let playlist_id = Uuid::parse_str(&playlist.guid).unwrap();

        let mut track_ids = Vec::new();
        for (i, title) in titles.iter().enumerate() {
            let row = insert_track(
                &pool,
                &NewTrack {
                    title: title.to_string(),
                    artist: None,
                    album: None,
                    duration_seconds: None,
                    file_path: format!("/m/{}.mp3", i),
                },
            )
            .await
            .unwrap();
            let track_id = Uuid::parse_str(&row.guid).unwrap();
            add_membership(&pool, playlist_id, track_id, true).await.unwrap();
            track_ids.push(track_id);
        }

        state.select_playlist(playlist_id).await;
        playlists.load_tracks(playlist_id).await.unwrap();

        let coordinator = ReorderCoordinator::new(
            pool.clone(),
            Arc::clone(&state),
            Arc::clone(&playlists),
            bus.clone(),
        );

        Fixture { pool, state, playlists, coordinator, bus, playlist_id, track_ids }
    }

    async fn local_titles(f: &Fixture) -> Vec<String> {
        f.playlists
            .tracks_snapshot()
            .await
            .iter()
            .map(|t| t.title.clone())
            .collect()
    }

    async fn persisted_titles(f: &Fixture) -> Vec<String> {
        list_playlist_tracks(&f.pool, f.playlist_id)
            .await
            .unwrap()
            .iter()
            .map(|(_, t)| t.title.clone())
            .collect()
    }

    #[tokio::test]
    async fn drag_first_onto_last_yields_array_move_order() {
        let f = fixture(&["A", "B", "C"]).await;

        let outcome = f.coordinator.reorder_tracks(0, 2).await.unwrap();
        assert!(matches!(outcome, DispatchOutcome::TracksReordered));

        assert_eq!(local_titles(&f).await, vec!["B", "C", "A"]);
        // Persisted sequence equals the local order
        assert_eq!(persisted_titles(&f).await, vec!["B", "C", "A"]);
    }

    #[tokio::test]
    async fn successful_reorder_notifies_subscribers() {
        let f = fixture(&["A", "B", "C"]).await;
        let mut rx = f.bus.subscribe();

        f.coordinator.reorder_tracks(0, 2).await.unwrap();

        // The emitted ordering matches what the store now holds
        match rx.recv().await.unwrap() {
            LibraryEvent::PlaylistTracksReordered { playlist_id, membership_ids, .. } => {
                assert_eq!(playlist_id, f.playlist_id);
                let persisted: Vec<Uuid> = list_playlist_tracks(&f.pool, f.playlist_id)
                    .await
                    .unwrap()
                    .iter()
                    .map(|(m, _)| Uuid::parse_str(&m.guid).unwrap())
                    .collect();
                assert_eq!(membership_ids, persisted);
            }
            other => panic!("expected PlaylistTracksReordered, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn same_start_and_end_is_a_noop() {
        let f = fixture(&["A", "B", "C"]).await;

        let outcome = f.coordinator.reorder_tracks(1, 1).await.unwrap();
        assert!(matches!(outcome, DispatchOutcome::Ignored(_)));
        assert_eq!(local_titles(&f).await, vec!["A", "B", "C"]);
        assert_eq!(persisted_titles(&f).await, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn duplicate_gesture_within_window_applies_once() {
        let f = fixture(&["A", "B", "C"]).await;

        let first = f.coordinator.reorder_tracks(0, 2).await.unwrap();
        assert!(matches!(first, DispatchOutcome::TracksReordered));

        // Same pair again, inside the debounce window: dropped
        let second = f.coordinator.reorder_tracks(0, 2).await.unwrap();
        assert!(matches!(second, DispatchOutcome::Ignored(_)));

        // Exactly one mutation applied
        assert_eq!(local_titles(&f).await, vec!["B", "C", "A"]);
        assert_eq!(persisted_titles(&f).await, vec!["B", "C", "A"]);
    }

    #[tokio::test]
    async fn gesture_accepted_again_after_window_expires() {
        let f = fixture(&["A", "B", "C"]).await;
        let coordinator = ReorderCoordinator::with_debounce(
            f.pool.clone(),
            Arc::clone(&f.state),
            Arc::clone(&f.playlists),
            EventBus::default(),
            Duration::from_millis(20),
        );

        coordinator.reorder_tracks(0, 2).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        let outcome = coordinator.reorder_tracks(0, 2).await.unwrap();
        assert!(matches!(outcome, DispatchOutcome::TracksReordered));
    }

    #[tokio::test]
    async fn attribute_sort_blocks_reordering() {
        let f = fixture(&["A", "B", "C"]).await;
        f.state.set_sort(SortMode::Title).await;

        let result = f.coordinator.reorder_tracks(0, 2).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(local_titles(&f).await, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn library_view_blocks_reordering() {
        let f = fixture(&["A", "B"]).await;
        f.state.set_view_mode(ViewMode::Library).await;

        let result = f.coordinator.reorder_tracks(0, 1).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn out_of_range_index_is_rejected() {
        let f = fixture(&["A", "B"]).await;

        let result = f.coordinator.reorder_tracks(0, 5).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(local_titles(&f).await, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn in_flight_operation_drops_second_gesture() {
        let f = fixture(&["A", "B", "C"]).await;

        let _held = f.coordinator.try_begin().unwrap();
        let outcome = f.coordinator.reorder_tracks(0, 2).await.unwrap();
        assert!(matches!(outcome, DispatchOutcome::Ignored(_)));
        assert_eq!(local_titles(&f).await, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn failed_persist_rolls_back_to_server_order() {
        let f = fixture(&["A", "B", "C"]).await;

        // Pull the rug out: remove all membership rows behind the
        // coordinator's back so the order write updates zero rows
        sqlx::query("DELETE FROM playlist_tracks")
            .execute(&f.pool)
            .await
            .unwrap();

        let result = f.coordinator.reorder_tracks(0, 2).await;
        assert!(matches!(result, Err(Error::WriteRejected(_))));

        // Rolled back to the authoritative (now empty) server order; no
        // optimistic order left behind
        assert!(f.playlists.tracks_snapshot().await.is_empty());
        assert_eq!(f.coordinator.phase(), ReorderPhase::Idle);

        // Error surfaced as a transient status message
        let status = f.state.status().await.unwrap();
        assert!(status.is_error);
    }

    #[tokio::test]
    async fn cross_playlist_move_tallies_partial_failure() {
        let f = fixture(&["A", "B"]).await;
        let target = insert_playlist(&f.pool, "Other", None).await.unwrap();
        let target_id = Uuid::parse_str(&target.guid).unwrap();

        let ids = vec![f.track_ids[0], Uuid::new_v4(), f.track_ids[1]];
        let report = f.coordinator.move_to_playlist(&ids, target_id).await.unwrap();

        assert_eq!(report.successful, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors.len(), 1);

        // Successful prefix semantics: both valid tracks landed
        let listing = list_playlist_tracks(&f.pool, target_id).await.unwrap();
        assert_eq!(listing.len(), 2);
    }

    #[tokio::test]
    async fn cross_playlist_move_allows_duplicates() {
        let f = fixture(&["A"]).await;
        let target = insert_playlist(&f.pool, "Other", None).await.unwrap();
        let target_id = Uuid::parse_str(&target.guid).unwrap();

        let ids = vec![f.track_ids[0], f.track_ids[0]];
        let report = f.coordinator.move_to_playlist(&ids, target_id).await.unwrap();

        assert_eq!(report.successful, 2);
        assert_eq!(list_playlist_tracks(&f.pool, target_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn move_to_unknown_playlist_is_validation_failure() {
        let f = fixture(&["A"]).await;

        let result = f.coordinator.move_to_playlist(&[f.track_ids[0]], Uuid::new_v4()).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn playlist_reorder_persists_display_order() {
        let f = fixture(&[]).await;
        insert_playlist(&f.pool, "Second", None).await.unwrap();
        insert_playlist(&f.pool, "Third", None).await.unwrap();
        f.playlists.fetch().await.unwrap();

        let outcome = f.coordinator.reorder_playlists(0, 2).await.unwrap();
        assert!(matches!(outcome, DispatchOutcome::PlaylistsReordered));

        let names: Vec<String> = f
            .playlists
            .fetch()
            .await
            .unwrap()
            .iter()
            .map(|p| p.name.clone())
            .collect();
        assert_eq!(names, vec!["Second", "Third", "Mix"]);
    }

    #[tokio::test]
    async fn failed_playlist_reorder_keeps_optimistic_order() {
        let f = fixture(&[]).await;
        insert_playlist(&f.pool, "Second", None).await.unwrap();
        f.playlists.fetch().await.unwrap();

        // Delete one playlist behind the coordinator's back so the batch
        // hits a zero-row update
        let stale: String = sqlx::query_scalar("SELECT guid FROM playlists WHERE name = 'Second'")
            .fetch_one(&f.pool)
            .await
            .unwrap();
        sqlx::query("DELETE FROM playlists WHERE guid = ?")
            .bind(&stale)
            .execute(&f.pool)
            .await
            .unwrap();

        let result = f.coordinator.reorder_playlists(0, 1).await;
        assert!(matches!(result, Err(Error::WriteRejected(_))));

        // Asymmetry with track reordering: no automatic rollback here
        let local: Vec<String> = f.playlists.current().await.iter().map(|p| p.name.clone()).collect();
        assert_eq!(local, vec!["Second", "Mix"]);
    }
}
