//! Konspekt Core Library
//!
//! Summarizes, explains and transcribes YouTube videos, Google Drive files and
//! local media with hosted models, then exports the result as text, DOCX or PDF.

pub mod audio;
pub mod client;
pub mod credentials;
pub mod error;
pub mod export;
pub mod fetch;
pub mod format;
pub mod language;
pub mod logging;
pub mod media;
pub mod orchestrator;
pub mod paths;
pub mod provider;
pub mod retry;
pub mod task;
pub mod transcribe;
pub mod types;

// Re-export commonly used items at crate root
pub use client::{GenerationRequest, GenerativeModel, ModelError, ModelInput, ProviderClient};
pub use credentials::Credentials;
pub use error::{KonspektError, Result};
pub use export::{ExportArtifact, ExportError, ExportFormat};
pub use format::{format_timestamp, format_transcript_plain, format_transcript_with_timestamps};
pub use language::TargetLanguage;
pub use media::{MediaReference, RemoteMedia, Upload, resolve_url};
pub use orchestrator::{RequestContent, SummaryRequest};
pub use provider::{Provider, ProviderConfig};
pub use retry::{RetryPolicy, Retrying};
pub use task::{TaskSelection, build_instruction};
pub use transcribe::{AnyTranscriber, HostedWhisper, LocalWhisper, Transcriber};
pub use types::{ResultText, Segment, Transcript};
