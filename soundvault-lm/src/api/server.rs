//! HTTP server setup and routing

use crate::clipboard::TrackClipboard;
use crate::playback::PlaybackController;
use crate::providers::comments::CommentStore;
use crate::providers::playlists::PlaylistProvider;
use crate::providers::tracks::TrackProvider;
use crate::reorder::ReorderCoordinator;
use crate::state::SharedState;
use axum::routing::{delete, get, post, put};
use axum::Router;
use soundvault_common::events::EventBus;
use soundvault_common::{Error, Result};
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared application context passed to all handlers
///
/// AppContext implements Clone, which gives us `FromRef<AppContext>` via
/// Axum's blanket implementation.
#[derive(Clone)]
pub struct AppContext {
    pub pool: SqlitePool,
    pub state: Arc<SharedState>,
    pub tracks: Arc<TrackProvider>,
    pub playlists: Arc<PlaylistProvider>,
    pub comments: Arc<CommentStore>,
    pub playback: Arc<PlaybackController>,
    pub coordinator: Arc<ReorderCoordinator>,
    pub clipboard: Arc<TrackClipboard>,
    pub bus: EventBus,
}

/// Build the application router
///
/// Split from `run` so integration tests can drive the router with
/// `tower::ServiceExt::oneshot` without binding a socket.
pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(super::handlers::health))
        // Auth
        .route("/auth/login", post(super::handlers::login))
        .route("/auth/logout", post(super::handlers::logout))
        // Tracks
        .route("/tracks", get(super::handlers::list_tracks))
        .route("/tracks", post(super::handlers::create_track))
        .route("/tracks/:track_id", get(super::handlers::get_track))
        .route("/tracks/:track_id", put(super::handlers::update_track))
        .route("/tracks/:track_id", delete(super::handlers::delete_track))
        // Comments and markers
        .route("/tracks/:track_id/comments", get(super::handlers::list_comments))
        .route("/tracks/:track_id/comments", post(super::handlers::create_comment))
        .route("/comments/:comment_id", delete(super::handlers::delete_comment))
        .route("/comments/:comment_id/select", post(super::handlers::select_comment))
        // Playlists
        .route("/playlists", get(super::handlers::list_playlists))
        .route("/playlists", post(super::handlers::create_playlist))
        .route("/playlists/reorder", post(super::handlers::reorder_playlists))
        .route("/playlists/:playlist_id", put(super::handlers::update_playlist))
        .route("/playlists/:playlist_id", delete(super::handlers::delete_playlist))
        .route("/playlists/:playlist_id/open", post(super::handlers::open_playlist))
        .route("/playlists/:playlist_id/tracks", get(super::handlers::list_playlist_tracks))
        .route("/playlists/:playlist_id/tracks", post(super::handlers::add_playlist_tracks))
        .route(
            "/playlists/:playlist_id/tracks/reorder",
            post(super::handlers::reorder_playlist_tracks),
        )
        .route(
            "/playlists/:playlist_id/tracks/:membership_id",
            delete(super::handlers::remove_playlist_track),
        )
        // Drag dispatch
        .route("/drag", post(super::handlers::drag))
        // Playback
        .route("/playback/play", post(super::handlers::play))
        .route("/playback/pause", post(super::handlers::pause))
        .route("/playback/resume", post(super::handlers::resume))
        .route("/playback/next", post(super::handlers::next_track))
        .route("/playback/previous", post(super::handlers::previous_track))
        .route("/playback/seek", post(super::handlers::seek))
        .route("/playback/mode", post(super::handlers::set_mode))
        .route("/playback/state", get(super::handlers::playback_state))
        // Clipboard
        .route("/clipboard/copy", post(super::handlers::clipboard_copy))
        .route("/clipboard/paste", post(super::handlers::clipboard_paste))
        // View and status
        .route("/view", get(super::handlers::get_view))
        .route("/view/sort", post(super::handlers::set_sort))
        .route("/status", get(super::handlers::get_status))
        // SSE event stream
        .route("/events", get(super::handlers::events))
        // Session middleware (skips /health, /auth/login, /events)
        .layer(axum::middleware::from_fn_with_state(
            ctx.clone(),
            super::middleware::require_session,
        ))
        .with_state(ctx)
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}

/// Run the HTTP API server until shutdown
pub async fn run(ctx: AppContext, port: u16) -> Result<()> {
    let app = build_router(ctx);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

    Ok(())
}

/// Graceful shutdown on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl+C received, shutting down"),
        _ = terminate => info!("SIGTERM received, shutting down"),
    }
}
