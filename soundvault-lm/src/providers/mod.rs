//! Resource providers
//!
//! Each provider owns one in-memory collection of view models, normalized
//! from database rows, and round-trips mutations through the data access
//! gateway. Optimistic mutations are applied to the in-memory collection
//! first and reconciled (or rolled back) after the write resolves.

pub mod comments;
pub mod playlists;
pub mod tracks;

use crate::db::parse_guid;
use serde::Serialize;
use soundvault_common::db::models::{PlaylistRow, PlaylistTrackRow, TrackRow};
use soundvault_common::Result;
use uuid::Uuid;

/// Track as displayed in the library or a playlist listing
///
/// `playlist_track_id` is present only in a playlist context: it names the
/// membership row, not the track. Within one playlist listing it is unique
/// even when `id` repeats (the same track added twice).
#[derive(Debug, Clone, Serialize)]
pub struct TrackView {
    pub id: Uuid,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration_seconds: Option<f64>,
    pub file_path: String,
    pub playlist_track_id: Option<Uuid>,
}

impl TrackView {
    pub fn from_row(row: &TrackRow) -> Result<Self> {
        Ok(Self {
            id: parse_guid(&row.guid)?,
            title: row.title.clone(),
            artist: row.artist.clone(),
            album: row.album.clone(),
            duration_seconds: row.duration_seconds,
            file_path: row.file_path.clone(),
            playlist_track_id: None,
        })
    }

    pub fn from_membership(membership: &PlaylistTrackRow, track: &TrackRow) -> Result<Self> {
        let mut view = Self::from_row(track)?;
        view.playlist_track_id = Some(parse_guid(&membership.guid)?);
        Ok(view)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i64,
}

impl PlaylistView {
    pub fn from_row(row: &PlaylistRow) -> Result<Self> {
        Ok(Self {
            id: parse_guid(&row.guid)?,
            name: row.name.clone(),
            description: row.description.clone(),
            display_order: row.display_order,
        })
    }
}
