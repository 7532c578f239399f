//! Session middleware
//!
//! Requires a valid `Authorization: Bearer <token>` session on every
//! route except login, health, and the SSE stream (the EventSource API
//! cannot send custom headers).

use crate::api::server::AppContext;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use soundvault_common::api::{auth, types::ErrorResponse};
use tracing::debug;

const OPEN_PATHS: &[&str] = &["/health", "/auth/login", "/events"];

pub async fn require_session(
    State(ctx): State<AppContext>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if OPEN_PATHS.contains(&path) {
        return next.run(request).await;
    }

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(token) = token else {
        return unauthorized("Missing bearer token");
    };

    match auth::validate_session(&ctx.pool, token).await {
        Ok(_user_guid) => next.run(request).await,
        Err(e) => {
            debug!("Rejected request to {}: {}", path, e);
            unauthorized(&e.to_string())
        }
    }
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(ErrorResponse::new(message))).into_response()
}
