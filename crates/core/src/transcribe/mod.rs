use std::future::Future;

use crate::{error::Result, media::Upload, types::Transcript};

mod hosted;
mod local;

pub use hosted::HostedWhisper;
pub use local::{LocalWhisper, MODEL_NAME, ensure_model};

/// Speech-to-text for uploaded media.
pub trait Transcriber: Send + Sync {
    fn name(&self) -> &str;

    fn transcribe(&self, upload: &Upload) -> impl Future<Output = Result<Transcript>> + Send;
}

/// Transcriber picked at runtime.
pub enum AnyTranscriber {
    Local(LocalWhisper),
    Hosted(HostedWhisper),
}

impl Transcriber for AnyTranscriber {
    fn name(&self) -> &str {
        match self {
            AnyTranscriber::Local(t) => t.name(),
            AnyTranscriber::Hosted(t) => t.name(),
        }
    }

    async fn transcribe(&self, upload: &Upload) -> Result<Transcript> {
        match self {
            AnyTranscriber::Local(t) => t.transcribe(upload).await,
            AnyTranscriber::Hosted(t) => t.transcribe(upload).await,
        }
    }
}
