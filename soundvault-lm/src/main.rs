//! Soundvault Library Manager - Main entry point
//!
//! Local-first music library service: track/playlist/comment CRUD,
//! drag-and-drop reordering with optimistic updates, and playback
//! navigation, served over a local HTTP API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use soundvault_common::api::auth;
use soundvault_common::config::resolve_root_folder;
use soundvault_common::db::init::{get_setting_i64, init_database};
use soundvault_common::events::EventBus;

use soundvault_lm::api::server::{self, AppContext};
use soundvault_lm::clipboard::TrackClipboard;
use soundvault_lm::playback::PlaybackController;
use soundvault_lm::providers::comments::CommentStore;
use soundvault_lm::providers::playlists::PlaylistProvider;
use soundvault_lm::providers::tracks::TrackProvider;
use soundvault_lm::reorder::ReorderCoordinator;
use soundvault_lm::state::SharedState;

/// Command-line arguments for soundvault-lm
#[derive(Parser, Debug)]
#[command(name = "soundvault-lm")]
#[command(about = "Library Manager service for Soundvault")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5730", env = "SOUNDVAULT_LM_PORT")]
    port: u16,

    /// Root folder containing the library database and music files
    #[arg(short, long, env = "SOUNDVAULT_ROOT_FOLDER")]
    root_folder: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soundvault_lm=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), "SOUNDVAULT_ROOT_FOLDER")
        .context("Failed to resolve root folder")?;
    std::fs::create_dir_all(&root_folder)
        .with_context(|| format!("Failed to create root folder {}", root_folder.display()))?;

    info!("Starting Soundvault Library Manager on port {}", args.port);
    info!("Root folder: {}", root_folder.display());

    let db_path = root_folder.join("library.db");
    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;
    auth::ensure_default_user(&pool)
        .await
        .context("Failed to ensure default user")?;

    let bus = EventBus::default();
    let state = Arc::new(SharedState::new(bus.clone()));
    let tracks = Arc::new(TrackProvider::new(pool.clone(), bus.clone()));
    let playlists = Arc::new(PlaylistProvider::new(pool.clone(), bus.clone()));
    let comments = Arc::new(CommentStore::new(pool.clone(), bus.clone()));
    let playback = Arc::new(PlaybackController::new(bus.clone()));
    let clipboard = Arc::new(TrackClipboard::new(pool.clone(), Arc::clone(&state), bus.clone()));

    let debounce_ms = get_setting_i64(&pool, "reorder_debounce_ms", 1000).await;
    let coordinator = Arc::new(ReorderCoordinator::with_debounce(
        pool.clone(),
        Arc::clone(&state),
        Arc::clone(&playlists),
        bus.clone(),
        Duration::from_millis(debounce_ms.max(0) as u64),
    ));

    // Warm the in-memory collections so the first request sees data
    tracks.fetch().await.context("Failed to load tracks")?;
    playlists.fetch().await.context("Failed to load playlists")?;
    info!(
        "Library loaded: {} tracks, {} playlists",
        tracks.current().await.len(),
        playlists.current().await.len()
    );

    let ctx = AppContext {
        pool,
        state,
        tracks,
        playlists,
        comments,
        playback,
        coordinator,
        clipboard,
        bus,
    };

    server::run(ctx, args.port)
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}
