use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use hawkeye_core::session::SessionError;
use hawkeye_core::upload::UploadError;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    PayloadTooLarge(String),
    UnsupportedMediaType(String),
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::PayloadTooLarge(m)
            | Self::UnsupportedMediaType(m)
            | Self::Internal(m) => write!(f, "{m}"),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NoVideo | SessionError::AnalysisInProgress => {
                Self::Conflict(e.to_string())
            },
            SessionError::NoAnalysisPending => Self::NotFound(e.to_string()),
            // A stale ticket means a background task lost a race; never a client fault.
            SessionError::StaleTicket { .. } => Self::Internal(e.to_string()),
        }
    }
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::NotAVideo(_) => Self::UnsupportedMediaType(e.to_string()),
            UploadError::TooLarge { .. } => Self::PayloadTooLarge(e.to_string()),
            UploadError::Empty => Self::BadRequest(e.to_string()),
        }
    }
}
