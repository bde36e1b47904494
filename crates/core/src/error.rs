use std::path::PathBuf;

use thiserror::Error;

use crate::{client::ModelError, export::ExportError};

#[derive(Error, Debug)]
pub enum KonspektError {
    #[error("Missing API key: set {env_var}, pass --api-key, or run `konspekt login {provider}`")]
    MissingApiKey { provider: String, env_var: String },

    #[error("Invalid API key for {provider}")]
    InvalidApiKey { provider: String },

    #[error("No media provided: pass a YouTube/Drive URL or a file")]
    EmptyMedia,

    #[error("Not a YouTube or Google Drive URL: {url}")]
    InvalidMediaUrl { url: String },

    #[error("Could not find a file id in Google Drive link: {url}")]
    UnparseableDriveLink { url: String },

    #[error("{client} cannot read media directly; transcribe it first")]
    UnsupportedMedia { client: String },

    #[error("Models cannot fetch {url} themselves; download it and send the file instead")]
    MediaNeedsDownload { url: String },

    #[error("{0}")]
    Model(#[from] ModelError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("`{name}` was not found on PATH; install it to continue")]
    BinaryNotFound { name: String },

    #[error("Download failed for {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Audio conversion failed for {input}: {reason}")]
    AudioConversionFailed { input: PathBuf, reason: String },

    #[error("Model download failed from {url}: {reason}")]
    ModelDownloadFailed { url: String, reason: String },

    #[error("Transcription failed: {reason}")]
    TranscriptionFailed { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Invalid credentials file: {0}")]
    CredentialsParse(#[from] toml::de::Error),

    #[error("Failed to write credentials file: {0}")]
    CredentialsWrite(#[from] toml::ser::Error),
}

impl KonspektError {
    /// True for errors raised before any network traffic happened.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            KonspektError::MissingApiKey { .. }
                | KonspektError::InvalidApiKey { .. }
                | KonspektError::EmptyMedia
                | KonspektError::InvalidMediaUrl { .. }
                | KonspektError::UnparseableDriveLink { .. }
                | KonspektError::UnsupportedMedia { .. }
                | KonspektError::MediaNeedsDownload { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, KonspektError>;
