//! Shared API surface: request/response types and session authentication

pub mod auth;
pub mod types;
