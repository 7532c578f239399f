//! # Soundvault Common Library
//!
//! Shared code for the Soundvault library manager:
//! - Database schema, initialization, and row models
//! - Event types (LibraryEvent enum)
//! - API request/response types
//! - Session authentication helpers
//! - Configuration loading
//! - SSE utilities

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod sse;

pub use error::{Error, Result};
pub use events::LibraryEvent;
