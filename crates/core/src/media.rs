use std::{path::Path, sync::LazyLock};

use regex::Regex;
use tokio::fs;

use crate::error::{KonspektError, Result};

static YOUTUBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://)?(?:www\.|m\.|music\.)?(?:youtube\.com/(?:watch\?(?:[^#]*&)?v=|shorts/|live/|embed/)|youtu\.be/)([A-Za-z0-9_-]{11})(?:[?&#/].*)?$",
    )
    .expect("valid youtube regex")
});

static DRIVE_HOST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?drive\.google\.com(?:/|$)").expect("valid drive host regex")
});

static DRIVE_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:/file/d/|[?&]id=)([A-Za-z0-9_-]{10,})").expect("valid drive id regex")
});

/// Media handed in by the user: a link or the bytes of a local file.
#[derive(Clone, Debug)]
pub enum MediaReference {
    Url(String),
    Upload(Upload),
}

#[derive(Clone, Debug)]
pub struct Upload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// A link that passed validation and was normalized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoteMedia {
    YouTube { video_id: String },
    Drive { file_id: String },
}

impl RemoteMedia {
    pub fn uri(&self) -> String {
        match self {
            RemoteMedia::YouTube { video_id } => {
                format!("https://www.youtube.com/watch?v={}", video_id)
            }
            RemoteMedia::Drive { file_id } => {
                format!("https://drive.google.com/uc?export=download&id={}", file_id)
            }
        }
    }

    /// Whether a hosted model can fetch this link on its own. Drive files
    /// have to be downloaded and sent inline.
    pub fn is_model_readable(&self) -> bool {
        matches!(self, RemoteMedia::YouTube { .. })
    }
}

/// Classifies a URL as YouTube or Drive by pattern only. No network access.
pub fn resolve_url(url: &str) -> Result<RemoteMedia> {
    let url = url.trim();
    if url.is_empty() {
        return Err(KonspektError::EmptyMedia);
    }

    if let Some(caps) = YOUTUBE_RE.captures(url) {
        return Ok(RemoteMedia::YouTube {
            video_id: caps[1].to_string(),
        });
    }

    if DRIVE_HOST_RE.is_match(url) {
        return drive_file_id(url)
            .map(|file_id| RemoteMedia::Drive { file_id })
            .ok_or_else(|| KonspektError::UnparseableDriveLink {
                url: url.to_string(),
            });
    }

    Err(KonspektError::InvalidMediaUrl {
        url: url.to_string(),
    })
}

pub fn drive_file_id(url: &str) -> Option<String> {
    DRIVE_ID_RE.captures(url).map(|caps| caps[1].to_string())
}

impl MediaReference {
    pub fn is_empty(&self) -> bool {
        match self {
            MediaReference::Url(url) => url.trim().is_empty(),
            MediaReference::Upload(upload) => upload.bytes.is_empty(),
        }
    }
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = detect_mime(&file_name, &bytes);
        Self {
            file_name,
            mime,
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

/// Sniffs the MIME type from content, falling back to the file extension.
pub fn detect_mime(file_name: &str, bytes: &[u8]) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }

    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let mime = match ext.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        "webm" => "video/webm",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        _ => "application/octet-stream",
    };
    mime.to_string()
}
