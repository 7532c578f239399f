//! HTTP request handlers

use crate::api::server::AppContext;
use crate::api::ApiResult;
use crate::db;
use crate::db::tracks::NewTrack;
use crate::playback::PlayMode;
use crate::providers::comments::CommentView;
use crate::providers::{PlaylistView, TrackView};
use crate::reorder::{classify, DispatchOutcome, DragPayload};
use crate::state::{SortMode, StatusMessage, ViewState};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::Json;
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use soundvault_common::api::auth;
use soundvault_common::api::types::{AddReport, LoginRequest, LoginResponse};
use soundvault_common::{Error, Result};
use std::convert::Infallible;
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTrackRequest {
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration_seconds: Option<f64>,
    pub file_path: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTrackRequest {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlaylistRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddTracksRequest {
    pub track_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub start_index: usize,
    pub end_index: usize,
}

/// A completed drag gesture, as reported by the UI
#[derive(Debug, Deserialize)]
pub struct DragRequest {
    pub active: DragPayload,
    pub over: Option<DragPayload>,
    #[serde(default)]
    pub start_index: usize,
    #[serde(default)]
    pub end_index: usize,
}

#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<AddReport>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    pub time_seconds: f64,
    #[serde(default)]
    pub with_marker: bool,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    pub track_id: Uuid,
    pub playlist_track_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SeekRequest {
    pub seconds: f64,
}

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub mode: PlayMode,
}

#[derive(Debug, Serialize)]
pub struct PlaybackStateResponse {
    pub track: Option<TrackView>,
    pub playing: bool,
    pub position_seconds: f64,
    pub mode: PlayMode,
}

#[derive(Debug, Deserialize)]
pub struct CopyRequest {
    pub track_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct PasteRequest {
    pub playlist_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SortRequest {
    pub sort: SortMode,
}

// ============================================================================
// Health and Auth
// ============================================================================

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "library_manager".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /auth/login
pub async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (token, user_guid) = auth::login(&ctx.pool, &req.username, &req.password).await?;
    Ok(Json(LoginResponse { token, user_guid }))
}

/// POST /auth/logout
pub async fn logout(State(ctx): State<AppContext>, headers: HeaderMap) -> ApiResult<StatusCode> {
    if let Some(token) = bearer_token(&headers) {
        auth::logout(&ctx.pool, token).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

// ============================================================================
// Tracks
// ============================================================================

/// GET /tracks - full library listing, or a search with ?q=
pub async fn list_tracks(
    State(ctx): State<AppContext>,
    Query(query): Query<TrackQuery>,
) -> ApiResult<Json<Vec<TrackView>>> {
    let tracks = match query.q.as_deref() {
        Some(q) if !q.is_empty() => ctx.tracks.search(q).await?,
        _ => ctx.tracks.fetch().await?,
    };
    Ok(Json(tracks))
}

/// POST /tracks
pub async fn create_track(
    State(ctx): State<AppContext>,
    Json(req): Json<CreateTrackRequest>,
) -> ApiResult<(StatusCode, Json<TrackView>)> {
    if req.title.trim().is_empty() {
        return Err(Error::InvalidInput("Track title cannot be empty".to_string()).into());
    }

    let view = ctx
        .tracks
        .create(NewTrack {
            title: req.title,
            artist: req.artist,
            album: req.album,
            duration_seconds: req.duration_seconds,
            file_path: req.file_path,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /tracks/:track_id
pub async fn get_track(
    State(ctx): State<AppContext>,
    Path(track_id): Path<Uuid>,
) -> ApiResult<Json<TrackView>> {
    let row = db::tracks::get_track(&ctx.pool, track_id).await?;
    Ok(Json(TrackView::from_row(&row)?))
}

/// PUT /tracks/:track_id
pub async fn update_track(
    State(ctx): State<AppContext>,
    Path(track_id): Path<Uuid>,
    Json(req): Json<UpdateTrackRequest>,
) -> ApiResult<Json<TrackView>> {
    let view = ctx
        .tracks
        .update(
            track_id,
            req.title.as_deref(),
            req.artist.as_deref(),
            req.album.as_deref(),
        )
        .await?;
    Ok(Json(view))
}

/// DELETE /tracks/:track_id
pub async fn delete_track(
    State(ctx): State<AppContext>,
    Path(track_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !ctx.tracks.delete(track_id).await? {
        return Err(Error::NotFound(format!("Track {}", track_id)).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Comments and Markers
// ============================================================================

/// GET /tracks/:track_id/comments - newest first, markers attached
pub async fn list_comments(
    State(ctx): State<AppContext>,
    Path(track_id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentView>>> {
    db::tracks::get_track(&ctx.pool, track_id).await?;
    let comments = ctx.comments.fetch(track_id).await?;
    Ok(Json(comments))
}

/// POST /tracks/:track_id/comments
pub async fn create_comment(
    State(ctx): State<AppContext>,
    Path(track_id): Path<Uuid>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentView>)> {
    if req.content.trim().is_empty() {
        return Err(Error::InvalidInput("Comment cannot be empty".to_string()).into());
    }
    db::tracks::get_track(&ctx.pool, track_id).await?;

    let view = ctx
        .comments
        .add_comment(track_id, &req.content, req.time_seconds, req.with_marker, req.color)
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// DELETE /comments/:comment_id
pub async fn delete_comment(
    State(ctx): State<AppContext>,
    Path(comment_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !ctx.comments.delete_comment(comment_id).await? {
        return Err(Error::NotFound(format!("Comment {}", comment_id)).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /comments/:comment_id/select - highlight region and seek playback
///
/// Always succeeds: a comment without a marker, an unknown region, or an
/// unattached renderer all degrade to doing nothing.
pub async fn select_comment(
    State(ctx): State<AppContext>,
    Path(comment_id): Path<Uuid>,
) -> StatusCode {
    ctx.comments.select_comment(comment_id, &ctx.playback).await;
    StatusCode::NO_CONTENT
}

// ============================================================================
// Playlists
// ============================================================================

/// GET /playlists - in display order
pub async fn list_playlists(State(ctx): State<AppContext>) -> ApiResult<Json<Vec<PlaylistView>>> {
    Ok(Json(ctx.playlists.fetch().await?))
}

/// POST /playlists
pub async fn create_playlist(
    State(ctx): State<AppContext>,
    Json(req): Json<CreatePlaylistRequest>,
) -> ApiResult<(StatusCode, Json<PlaylistView>)> {
    let view = ctx.playlists.create(&req.name, req.description.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// PUT /playlists/:playlist_id
pub async fn update_playlist(
    State(ctx): State<AppContext>,
    Path(playlist_id): Path<Uuid>,
    Json(req): Json<UpdatePlaylistRequest>,
) -> ApiResult<Json<PlaylistView>> {
    let view = ctx
        .playlists
        .update(playlist_id, req.name.as_deref(), req.description.as_deref())
        .await?;
    Ok(Json(view))
}

/// DELETE /playlists/:playlist_id
///
/// Clears the view selection if the deleted playlist was open, so the
/// track table falls back to the library.
pub async fn delete_playlist(
    State(ctx): State<AppContext>,
    Path(playlist_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !ctx.playlists.delete(playlist_id).await? {
        return Err(Error::NotFound(format!("Playlist {}", playlist_id)).into());
    }
    ctx.state.clear_selection_if(playlist_id).await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /playlists/:playlist_id/open - select and load the track listing
pub async fn open_playlist(
    State(ctx): State<AppContext>,
    Path(playlist_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TrackView>>> {
    db::playlists::get_playlist(&ctx.pool, playlist_id).await?;
    ctx.state.select_playlist(playlist_id).await;
    let listing = ctx.playlists.load_tracks(playlist_id).await?;
    Ok(Json(listing))
}

/// GET /playlists/:playlist_id/tracks - listing without changing the view
pub async fn list_playlist_tracks(
    State(ctx): State<AppContext>,
    Path(playlist_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TrackView>>> {
    db::playlists::get_playlist(&ctx.pool, playlist_id).await?;
    let rows = db::playlists::list_playlist_tracks(&ctx.pool, playlist_id).await?;
    let views: Vec<TrackView> = rows
        .iter()
        .map(|(membership, track)| TrackView::from_membership(membership, track))
        .collect::<Result<_>>()?;
    Ok(Json(views))
}

/// POST /playlists/:playlist_id/tracks - batch add, duplicates allowed
pub async fn add_playlist_tracks(
    State(ctx): State<AppContext>,
    Path(playlist_id): Path<Uuid>,
    Json(req): Json<AddTracksRequest>,
) -> ApiResult<Json<AddReport>> {
    let report = ctx.coordinator.move_to_playlist(&req.track_ids, playlist_id).await?;
    Ok(Json(report))
}

/// DELETE /playlists/:playlist_id/tracks/:membership_id
///
/// Removes one occurrence; other memberships of the same track stay.
pub async fn remove_playlist_track(
    State(ctx): State<AppContext>,
    Path((_playlist_id, membership_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    if !db::playlists::remove_membership(&ctx.pool, membership_id).await? {
        return Err(Error::NotFound(format!("Membership {}", membership_id)).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Reordering
// ============================================================================

/// POST /playlists/:playlist_id/tracks/reorder
pub async fn reorder_playlist_tracks(
    State(ctx): State<AppContext>,
    Path(playlist_id): Path<Uuid>,
    Json(req): Json<ReorderRequest>,
) -> ApiResult<Json<ReorderResponse>> {
    // The coordinator reorders the open playlist; a mismatched path means
    // the client's view is stale
    let view = ctx.state.view().await;
    if view.selected_playlist != Some(playlist_id) {
        return Err(Error::InvalidInput(format!("Playlist {} is not open", playlist_id)).into());
    }

    let outcome = ctx.coordinator.reorder_tracks(req.start_index, req.end_index).await?;
    Ok(Json(outcome_response(outcome)))
}

/// POST /playlists/reorder
pub async fn reorder_playlists(
    State(ctx): State<AppContext>,
    Json(req): Json<ReorderRequest>,
) -> ApiResult<Json<ReorderResponse>> {
    let outcome = ctx.coordinator.reorder_playlists(req.start_index, req.end_index).await?;
    Ok(Json(outcome_response(outcome)))
}

/// POST /drag - classify and execute a completed drag gesture
pub async fn drag(
    State(ctx): State<AppContext>,
    Json(req): Json<DragRequest>,
) -> ApiResult<Json<ReorderResponse>> {
    let intent = classify(&req.active, req.over.as_ref(), req.start_index, req.end_index);
    let outcome = ctx.coordinator.dispatch(intent).await?;
    Ok(Json(outcome_response(outcome)))
}

fn outcome_response(outcome: DispatchOutcome) -> ReorderResponse {
    match outcome {
        DispatchOutcome::TracksReordered => ReorderResponse {
            status: "tracks_reordered".to_string(),
            report: None,
        },
        DispatchOutcome::PlaylistsReordered => ReorderResponse {
            status: "playlists_reordered".to_string(),
            report: None,
        },
        DispatchOutcome::Moved(report) => ReorderResponse {
            status: "moved".to_string(),
            report: Some(report),
        },
        DispatchOutcome::Ignored(reason) => ReorderResponse {
            status: format!("ignored: {}", reason),
            report: None,
        },
    }
}

// ============================================================================
// Playback
// ============================================================================

/// POST /playback/play
pub async fn play(
    State(ctx): State<AppContext>,
    Json(req): Json<PlayRequest>,
) -> ApiResult<StatusCode> {
    // Prefer the membership occurrence from the open playlist so duplicate
    // tracks resolve correctly
    let view = match req.playlist_track_id {
        Some(membership) => ctx
            .playlists
            .tracks_snapshot()
            .await
            .into_iter()
            .find(|t| t.playlist_track_id == Some(membership)),
        None => None,
    };

    let view = match view {
        Some(v) => v,
        None => {
            let row = db::tracks::get_track(&ctx.pool, req.track_id).await?;
            TrackView::from_row(&row)?
        }
    };

    ctx.playback.play(view).await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /playback/pause
pub async fn pause(State(ctx): State<AppContext>) -> StatusCode {
    ctx.playback.pause().await;
    StatusCode::NO_CONTENT
}

/// POST /playback/resume
pub async fn resume(State(ctx): State<AppContext>) -> StatusCode {
    ctx.playback.resume().await;
    StatusCode::NO_CONTENT
}

/// POST /playback/next
pub async fn next_track(State(ctx): State<AppContext>) -> StatusCode {
    let listing = visible_listing(&ctx).await;
    ctx.playback.next(&listing).await;
    StatusCode::NO_CONTENT
}

/// POST /playback/previous
pub async fn previous_track(State(ctx): State<AppContext>) -> StatusCode {
    let listing = visible_listing(&ctx).await;
    ctx.playback.previous(&listing).await;
    StatusCode::NO_CONTENT
}

/// POST /playback/seek
pub async fn seek(State(ctx): State<AppContext>, Json(req): Json<SeekRequest>) -> StatusCode {
    ctx.playback.seek(req.seconds).await;
    StatusCode::NO_CONTENT
}

/// POST /playback/mode
pub async fn set_mode(State(ctx): State<AppContext>, Json(req): Json<ModeRequest>) -> StatusCode {
    ctx.playback.set_mode(req.mode).await;
    StatusCode::NO_CONTENT
}

/// GET /playback/state
pub async fn playback_state(State(ctx): State<AppContext>) -> Json<PlaybackStateResponse> {
    Json(PlaybackStateResponse {
        track: ctx.playback.current().await,
        playing: ctx.playback.is_playing().await,
        position_seconds: ctx.playback.position().await,
        mode: ctx.playback.mode().await,
    })
}

/// Next/previous navigate over whatever the track table is showing
async fn visible_listing(ctx: &AppContext) -> Vec<TrackView> {
    use crate::state::ViewMode;

    match ctx.state.view().await.mode {
        ViewMode::Playlist => ctx.playlists.tracks_snapshot().await,
        ViewMode::Library => ctx.tracks.current().await,
    }
}

// ============================================================================
// Clipboard
// ============================================================================

/// POST /clipboard/copy
pub async fn clipboard_copy(
    State(ctx): State<AppContext>,
    Json(req): Json<CopyRequest>,
) -> ApiResult<StatusCode> {
    let mut selection = Vec::with_capacity(req.track_ids.len());
    for track_id in &req.track_ids {
        let row = db::tracks::get_track(&ctx.pool, *track_id).await?;
        selection.push(TrackView::from_row(&row)?);
    }

    ctx.clipboard.copy(selection).await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /clipboard/paste
pub async fn clipboard_paste(
    State(ctx): State<AppContext>,
    Json(req): Json<PasteRequest>,
) -> ApiResult<Json<AddReport>> {
    let report = ctx.clipboard.paste_into(req.playlist_id).await?;
    Ok(Json(report))
}

// ============================================================================
// View and Status
// ============================================================================

/// GET /view
pub async fn get_view(State(ctx): State<AppContext>) -> Json<ViewState> {
    Json(ctx.state.view().await)
}

/// POST /view/sort
pub async fn set_sort(State(ctx): State<AppContext>, Json(req): Json<SortRequest>) -> StatusCode {
    ctx.state.set_sort(req.sort).await;
    StatusCode::NO_CONTENT
}

/// GET /status - current transient status line, if any
pub async fn get_status(State(ctx): State<AppContext>) -> Json<Option<StatusMessage>> {
    Json(ctx.state.status().await)
}

/// GET /events - SSE stream of library events
pub async fn events(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    soundvault_common::sse::event_sse_stream(&ctx.bus)
}
