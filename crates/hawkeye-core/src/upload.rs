use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default cap on an uploaded video (100 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Longest file name kept on a handle; longer names are truncated.
const MAX_FILE_NAME_CHARS: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    NotAVideo(String),
    Empty,
    TooLarge { size: u64, max: u64 },
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAVideo(ct) => write!(f, "not a video file: {ct:?}"),
            Self::Empty => write!(f, "uploaded file is empty"),
            Self::TooLarge { size, max } => {
                write!(f, "file too large: {size} bytes (max {max})")
            },
        }
    }
}

impl std::error::Error for UploadError {}

/// An accepted video. Only metadata; the bytes are never inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoHandle {
    pub id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
    /// Where a player can fetch the video back from.
    pub locator: String,
}

/// Check an upload at the boundary and mint a handle for it.
pub fn accept_video(
    file_name: &str,
    content_type: &str,
    size: u64,
    max_bytes: u64,
) -> Result<VideoHandle, UploadError> {
    let content_type = content_type.trim().to_ascii_lowercase();
    if !is_video_content_type(&content_type) {
        return Err(UploadError::NotAVideo(content_type));
    }
    if size == 0 {
        return Err(UploadError::Empty);
    }
    if size > max_bytes {
        return Err(UploadError::TooLarge {
            size,
            max: max_bytes,
        });
    }

    let id = Uuid::new_v4();
    Ok(VideoHandle {
        id,
        file_name: clean_file_name(file_name),
        content_type,
        size,
        locator: video_locator(id),
    })
}

/// Whether a MIME type names a video (`video/*`).
pub fn is_video_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .and_then(|essence| essence.strip_prefix("video/"))
        .is_some_and(|subtype| !subtype.is_empty())
}

pub fn video_locator(id: Uuid) -> String {
    format!("/api/v1/videos/{id}")
}

fn clean_file_name(name: &str) -> String {
    // Keep only the last path component.
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if base.is_empty() {
        return "upload".to_string();
    }
    base.chars()
        .filter(|c| !c.is_control())
        .take(MAX_FILE_NAME_CHARS)
        .collect()
}
