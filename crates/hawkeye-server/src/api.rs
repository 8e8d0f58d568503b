use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hawkeye_core::scene::Scene;
use hawkeye_core::session::{AnalysisTicket, SessionError, SessionSnapshot};
use hawkeye_core::stats::StatsPanel;
use hawkeye_core::trajectory::Trajectory;
use hawkeye_core::upload::{UploadError, VideoHandle, accept_video, is_video_content_type};

use crate::analysis::spawn_analysis;
use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the original file name of an upload.
pub const FILE_NAME_HEADER: &str = "x-file-name";

/// Response for an accepted analysis trigger.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisStarted {
    pub ticket: AnalysisTicket,
    pub delay_ms: u64,
}

fn header_str<'a>(headers: &'a HeaderMap, name: impl header::AsHeaderName) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn no_trajectory() -> AppError {
    AppError::NotFound("no trajectory yet, run an analysis first".to_string())
}

/// POST /api/v1/videos: accept a raw video body.
pub async fn upload_video(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<(StatusCode, Json<VideoHandle>), AppError> {
    let max = state.config.limits.max_upload_bytes;
    let content_type = header_str(&headers, header::CONTENT_TYPE);

    // Reject before reading anything we would throw away.
    if !is_video_content_type(&content_type.trim().to_ascii_lowercase()) {
        return Err(UploadError::NotAVideo(content_type.to_string()).into());
    }
    if let Ok(declared) = header_str(&headers, header::CONTENT_LENGTH).parse::<u64>()
        && declared > max
    {
        return Err(UploadError::TooLarge {
            size: declared,
            max,
        }
        .into());
    }

    let limit = usize::try_from(max).unwrap_or(usize::MAX);
    let bytes = axum::body::to_bytes(body, limit).await.map_err(|e| {
        tracing::debug!("Upload body rejected: {e}");
        AppError::PayloadTooLarge(format!("upload exceeds {max} bytes or was interrupted"))
    })?;

    let file_name = match header_str(&headers, FILE_NAME_HEADER) {
        "" => "upload",
        name => name,
    };
    let handle = accept_video(file_name, content_type, bytes.len() as u64, max)?;

    let mut session = state.session.write().await;
    session.load_video(handle.clone())?;
    state.videos.write().await.insert(handle.clone(), bytes);
    state.playback.stop().await;
    drop(session);

    tracing::info!(
        video_id = %handle.id,
        size = handle.size,
        content_type = %handle.content_type,
        "Video uploaded"
    );
    Ok((StatusCode::CREATED, Json(handle)))
}

/// GET /api/v1/videos/{id}: stream back a stored upload.
pub async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.videos.read().await;
    let stored = store
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("video {id} not found")))?;
    Ok((
        [(header::CONTENT_TYPE, stored.handle.content_type.clone())],
        stored.bytes.clone(),
    ))
}

/// POST /api/v1/analyze: start the simulated analysis.
pub async fn start_analysis(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<AnalysisStarted>), AppError> {
    let ticket = {
        let mut session = state.session.write().await;
        let ticket = session.begin_analysis()?;
        state.playback.stop().await;
        ticket
    };

    let job = spawn_analysis(state.clone(), ticket);
    if let Some(previous) = state.analysis.lock().await.replace(job)
        && !previous.is_finished()
    {
        tracing::warn!(ticket = %previous.ticket, "Replacing analysis task that is still running");
        previous.cancel();
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(AnalysisStarted {
            ticket,
            delay_ms: state.config.analysis.delay_ms,
        }),
    ))
}

/// POST /api/v1/analyze/cancel: abandon the outstanding analysis.
pub async fn cancel_analysis(
    State(state): State<AppState>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let (ticket, snapshot) = {
        let mut session = state.session.write().await;
        let ticket = session.pending().ok_or(SessionError::NoAnalysisPending)?;
        session.cancel_analysis(ticket)?;
        (ticket, session.snapshot())
    };

    let mut slot = state.analysis.lock().await;
    if slot.as_ref().is_some_and(|job| job.ticket == ticket)
        && let Some(job) = slot.take()
    {
        job.cancel();
    }
    Ok(Json(snapshot))
}

/// GET /api/v1/session
pub async fn get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session.read().await.snapshot())
}

/// GET /api/v1/trajectory
pub async fn get_trajectory(State(state): State<AppState>) -> Result<Json<Trajectory>, AppError> {
    let session = state.session.read().await;
    let trajectory = session.trajectory().ok_or_else(no_trajectory)?;
    Ok(Json(Trajectory::clone(trajectory)))
}

/// GET /api/v1/stats
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsPanel>, AppError> {
    let session = state.session.read().await;
    let trajectory = session.trajectory().ok_or_else(no_trajectory)?;
    Ok(Json(StatsPanel::from_trajectory(trajectory)))
}

/// GET /api/v1/scene
pub async fn get_scene(State(state): State<AppState>) -> Json<Scene> {
    let session = state.session.read().await;
    Json(Scene::for_trajectory(session.trajectory().map(Arc::as_ref)))
}

/// POST /api/v1/replay: restart playback from the release point.
pub async fn replay(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let session = state.session.read().await;
    let trajectory = session.trajectory().ok_or_else(no_trajectory)?;
    state.playback.start(Arc::clone(trajectory)).await;
    Ok(StatusCode::ACCEPTED)
}
