pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod health;
pub mod playback;
pub mod sse;
pub mod state;
pub mod video_store;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use config::ServerConfig;
use state::AppState;

/// Build the Axum router and application state from a config.
pub fn build_app(config: ServerConfig) -> (Router<()>, AppState) {
    let web_root = config.web_root.clone();
    let upload_limit = usize::try_from(config.limits.max_upload_bytes).unwrap_or(usize::MAX);
    let state = AppState::new(config);

    let api_routes = Router::new()
        .route(
            "/videos",
            post(api::upload_video).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/videos/{id}", get(api::get_video))
        .route("/analyze", post(api::start_analysis))
        .route("/analyze/cancel", post(api::cancel_analysis))
        .route("/session", get(api::get_session))
        .route("/trajectory", get(api::get_trajectory))
        .route("/stats", get(api::get_stats))
        .route("/scene", get(api::get_scene))
        .route("/replay", post(api::replay))
        .route("/playback/stream", get(sse::playback_stream));

    let app = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api/v1", api_routes)
        .fallback_service(ServeDir::new(&web_root))
        .layer(CorsLayer::permissive())
        .with_state(state.clone());

    (app, state)
}

/// Cancel background work and wait for the outstanding analysis task.
pub async fn shutdown(state: &AppState) {
    state.shutdown.cancel();
    let job = state.analysis.lock().await.take();
    if let Some(job) = job {
        job.join().await;
    }
    state.playback.stop().await;
    tracing::info!("Background tasks stopped");
}
