//! HTTP API
//!
//! Axum router, handlers, and the session middleware. Handlers return
//! `ApiResult`, which maps domain errors onto HTTP status codes in one
//! place.

pub mod handlers;
pub mod middleware;
pub mod server;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use soundvault_common::api::types::ErrorResponse;
use soundvault_common::Error;
use tracing::error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Domain error carried across the handler boundary
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::WriteRejected(_) => StatusCode::CONFLICT,
            _ => {
                error!("Internal error in handler: {}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorResponse::new(self.0.to_string()))).into_response()
    }
}
