//! Soundvault Library Manager (soundvault-lm)
//!
//! Local-first music library manager service: track/playlist/comment CRUD,
//! drag-and-drop reordering with optimistic updates, waveform marker
//! synchronization, and playback navigation, served over a local HTTP API.

pub mod api;
pub mod clipboard;
pub mod db;
pub mod playback;
pub mod providers;
pub mod reorder;
pub mod state;
