//! Drag gesture classification
//!
//! A completed drag carries payloads describing what was picked up and
//! what it was dropped on. Classification is a pure function from those
//! payloads to a `DragIntent`; the coordinator dispatches on the intent.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a drag handle carries: the dragged or hovered entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DragPayload {
    Track {
        track_id: Uuid,
        /// Membership row id when dragged out of a playlist listing
        playlist_track_id: Option<Uuid>,
        /// True when the drag started in a playlist view (required for
        /// intra-playlist reordering)
        from_playlist: bool,
        /// Additional selected track ids for multi-drag
        #[serde(default)]
        selected: Vec<Uuid>,
    },
    Playlist {
        playlist_id: Uuid,
    },
}

/// Classified intent of a completed drag
#[derive(Debug, Clone, PartialEq)]
pub enum DragIntent {
    /// Reorder tracks within the open playlist
    ReorderTracks { start_index: usize, end_index: usize },
    /// Add the dragged track(s) to another playlist
    MoveToPlaylist {
        track_ids: Vec<Uuid>,
        target_playlist: Uuid,
    },
    /// Reorder the playlist list itself
    ReorderPlaylists { start_index: usize, end_index: usize },
    /// Nothing to do (no drop target, or an unsupported combination)
    NoOp,
}

/// Classify a completed drag
///
/// Decision table:
/// - track over track: intra-playlist reorder, but only when the drag
///   started in a playlist view (library rows have no manual order)
/// - track over playlist: cross-playlist move of the dragged track plus
///   any multi-selection
/// - playlist over playlist: playlist-list reorder
/// - anything else, or no drop target: no-op
pub fn classify(
    active: &DragPayload,
    over: Option<&DragPayload>,
    start_index: usize,
    end_index: usize,
) -> DragIntent {
    let Some(over) = over else {
        return DragIntent::NoOp;
    };

    match (active, over) {
        (
            DragPayload::Track { from_playlist, .. },
            DragPayload::Track { .. },
        ) => {
            if *from_playlist {
                DragIntent::ReorderTracks { start_index, end_index }
            } else {
                DragIntent::NoOp
            }
        }
        (
            DragPayload::Track { track_id, selected, .. },
            DragPayload::Playlist { playlist_id },
        ) => {
            let track_ids = if selected.is_empty() {
                vec![*track_id]
            } else {
                selected.clone()
            };
            DragIntent::MoveToPlaylist {
                track_ids,
                target_playlist: *playlist_id,
            }
        }
        (DragPayload::Playlist { .. }, DragPayload::Playlist { .. }) => {
            DragIntent::ReorderPlaylists { start_index, end_index }
        }
        _ => DragIntent::NoOp,
    }
}

/// Stable array move: remove the element at `from`, insert it at `to`,
/// shifting the elements in between by one.
///
/// Callers validate bounds; this helper assumes them.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    let item = items.remove(from);
    items.insert(to, item);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track_payload(from_playlist: bool, selected: Vec<Uuid>) -> DragPayload {
        DragPayload::Track {
            track_id: Uuid::new_v4(),
            playlist_track_id: from_playlist.then(Uuid::new_v4),
            from_playlist,
            selected,
        }
    }

    fn playlist_payload() -> DragPayload {
        DragPayload::Playlist { playlist_id: Uuid::new_v4() }
    }

    #[test]
    fn track_over_track_in_playlist_view_reorders() {
        let intent = classify(&track_payload(true, vec![]), Some(&track_payload(true, vec![])), 0, 2);
        assert_eq!(intent, DragIntent::ReorderTracks { start_index: 0, end_index: 2 });
    }

    #[test]
    fn track_over_track_from_library_is_noop() {
        let intent = classify(&track_payload(false, vec![]), Some(&track_payload(false, vec![])), 0, 2);
        assert_eq!(intent, DragIntent::NoOp);
    }

    #[test]
    fn track_over_playlist_moves_single_track() {
        let active = track_payload(false, vec![]);
        let over = playlist_payload();
        let intent = classify(&active, Some(&over), 0, 0);

        let DragIntent::MoveToPlaylist { track_ids, target_playlist } = intent else {
            panic!("expected MoveToPlaylist");
        };
        let DragPayload::Track { track_id, .. } = active else { unreachable!() };
        let DragPayload::Playlist { playlist_id } = over else { unreachable!() };
        assert_eq!(track_ids, vec![track_id]);
        assert_eq!(target_playlist, playlist_id);
    }

    #[test]
    fn multi_selection_overrides_single_track() {
        let selection = vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let intent = classify(
            &track_payload(true, selection.clone()),
            Some(&playlist_payload()),
            0,
            0,
        );

        let DragIntent::MoveToPlaylist { track_ids, .. } = intent else {
            panic!("expected MoveToPlaylist");
        };
        assert_eq!(track_ids, selection);
    }

    #[test]
    fn playlist_over_playlist_reorders_playlists() {
        let intent = classify(&playlist_payload(), Some(&playlist_payload()), 3, 1);
        assert_eq!(intent, DragIntent::ReorderPlaylists { start_index: 3, end_index: 1 });
    }

    #[test]
    fn playlist_over_track_is_noop() {
        let intent = classify(&playlist_payload(), Some(&track_payload(true, vec![])), 0, 1);
        assert_eq!(intent, DragIntent::NoOp);
    }

    #[test]
    fn missing_drop_target_is_noop() {
        let intent = classify(&track_payload(true, vec![]), None, 0, 1);
        assert_eq!(intent, DragIntent::NoOp);
    }

    #[test]
    fn array_move_forward_and_backward() {
        let mut forward = vec!['a', 'b', 'c', 'd'];
        array_move(&mut forward, 0, 2);
        assert_eq!(forward, vec!['b', 'c', 'a', 'd']);

        let mut backward = vec!['a', 'b', 'c', 'd'];
        array_move(&mut backward, 3, 1);
        assert_eq!(backward, vec!['a', 'd', 'b', 'c']);
    }

    #[test]
    fn array_move_to_same_index_is_identity() {
        let mut items = vec![1, 2, 3];
        array_move(&mut items, 1, 1);
        assert_eq!(items, vec![1, 2, 3]);
    }
}
