//! Server-Sent Events (SSE) utilities
//!
//! Bridges the library event bus to an axum SSE response so a local UI
//! can observe mutations without polling.

use crate::events::{EventBus, LibraryEvent};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info};

/// Create an SSE stream that forwards library events to one client
///
/// Lagged receivers (slow clients) skip missed events rather than
/// terminating the stream.
pub fn event_sse_stream(bus: &EventBus) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to library events");
    let rx = bus.subscribe();

    // Initial connected status so the client can show connection state
    let connected =
        stream::once(async { Ok(Event::default().event("ConnectionStatus").data("connected")) });

    let events = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => Some(Ok(Event::default().event(event_name(&event)).data(json))),
                Err(e) => {
                    debug!("SSE: failed to serialize event: {}", e);
                    None
                }
            },
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                debug!("SSE: client lagged, skipped {} events", skipped);
                None
            }
        }
    });

    Sse::new(connected.chain(events)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}

fn event_name(event: &LibraryEvent) -> &'static str {
    match event {
        LibraryEvent::TrackListChanged { .. } => "TrackListChanged",
        LibraryEvent::PlaylistListChanged { .. } => "PlaylistListChanged",
        LibraryEvent::PlaylistsReordered { .. } => "PlaylistsReordered",
        LibraryEvent::PlaylistTracksReordered { .. } => "PlaylistTracksReordered",
        LibraryEvent::TracksAddedToPlaylist { .. } => "TracksAddedToPlaylist",
        LibraryEvent::CommentAdded { .. } => "CommentAdded",
        LibraryEvent::PlaybackChanged { .. } => "PlaybackChanged",
        LibraryEvent::StatusMessage { .. } => "StatusMessage",
    }
}
