use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use futures::stream::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use hawkeye_core::playback::PlaybackFrame;

use crate::state::{AppState, ConnectionGuard};

/// GET /api/v1/playback/stream: live ball frames from the replay loop.
pub async fn playback_stream(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, StatusCode> {
    let max_sse = state.config.playback.max_subscribers;
    let current = state.sse_subscriber_count.load(Ordering::Relaxed);
    if current >= max_sse {
        tracing::warn!(current, max = max_sse, "SSE subscriber limit reached");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    let guard = ConnectionGuard::new(Arc::clone(&state.sse_subscriber_count));
    let rx = state.playback.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result: Result<PlaybackFrame, _>| {
        let _guard = &guard;
        match result {
            Ok(frame) => {
                let json = serde_json::to_string(&frame).unwrap_or_default();
                Some(Ok(SseEvent::default()
                    .event("frame")
                    .data(json)
                    .id(frame.tick.to_string())))
            },
            Err(e) => {
                // Slow viewers skip frames rather than stall the loop.
                tracing::debug!("SSE playback receive error: {e}");
                None
            },
        }
    });

    // End the stream on shutdown so graceful shutdown is not held open.
    let stream = futures::StreamExt::take_until(stream, state.shutdown.clone().cancelled_owned());

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
