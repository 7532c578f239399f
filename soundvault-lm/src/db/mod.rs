//! Data access gateway
//!
//! Parameterized queries and writes against the SQLite store. Providers
//! and the reorder coordinator go through these functions; nothing else
//! in the service issues SQL.

pub mod comments;
pub mod playlists;
pub mod tracks;

use soundvault_common::{Error, Result};
use uuid::Uuid;

/// Parse a TEXT guid column into a Uuid
pub(crate) fn parse_guid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::Internal(format!("Bad guid '{}': {}", value, e)))
}
