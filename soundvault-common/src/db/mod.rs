//! Database access layer
//!
//! Schema creation, connection pool setup, and row models shared by the
//! Soundvault services.

pub mod init;
pub mod models;

pub use init::init_database;
