//! Database row models
//!
//! Raw rows as stored in SQLite. The library-manager service normalizes
//! these into view models before handing them to API consumers.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrackRow {
    pub guid: String,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration_seconds: Option<f64>,
    pub file_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlaylistRow {
    pub guid: String,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i64,
}

/// Membership row joining a track into a playlist at a position.
///
/// `guid` identifies the membership itself, not the track: the same track
/// may appear in a playlist more than once, each occurrence with its own
/// membership guid and position.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlaylistTrackRow {
    pub guid: String,
    pub playlist_id: String,
    pub track_id: String,
    pub position: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommentRow {
    pub guid: String,
    pub track_id: String,
    pub content: String,
    pub time_seconds: f64,
    pub created_at: String,
}

/// Waveform marker owned by exactly one comment.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MarkerRow {
    pub guid: String,
    pub comment_id: String,
    pub track_id: String,
    pub time_seconds: f64,
    pub region_id: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub guid: String,
    pub username: String,
    pub password_hash: String,
    pub password_salt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Setting {
    pub key: String,
    pub value: String,
}
