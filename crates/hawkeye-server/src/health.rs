use std::sync::atomic::Ordering;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use hawkeye_core::session::SessionPhase;

use crate::state::AppState;

/// Structured health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub connections: ConnectionInfo,
    pub session: SessionInfo,
    pub storage: StorageInfo,
}

#[derive(Serialize)]
pub struct ConnectionInfo {
    pub sse: usize,
}

#[derive(Serialize)]
pub struct SessionInfo {
    pub phase: SessionPhase,
    pub playback_running: bool,
}

#[derive(Serialize)]
pub struct StorageInfo {
    pub videos: usize,
    pub bytes: usize,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let sse = state.sse_subscriber_count.load(Ordering::Relaxed);
    let phase = state.session.read().await.phase();
    let (videos, bytes) = {
        let store = state.videos.read().await;
        (store.len(), store.total_bytes())
    };
    let playback_running = state.playback.is_running().await;

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        connections: ConnectionInfo { sse },
        session: SessionInfo {
            phase,
            playback_running,
        },
        storage: StorageInfo { videos, bytes },
    })
}

/// GET /ready: 200 once state is initialized, 503 while shutting down.
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.shutdown.is_cancelled() {
        return (StatusCode::SERVICE_UNAVAILABLE, "not ready: shutting down");
    }
    (StatusCode::OK, "ready")
}
