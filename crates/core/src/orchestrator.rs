//! Turns a (media, task, language) triple into a single model call.

use crate::{
    client::{GenerationRequest, GenerativeModel, ModelInput},
    error::{KonspektError, Result},
    language::TargetLanguage,
    media::{self, MediaReference},
    task::{TaskSelection, build_instruction},
    types::ResultText,
};

/// What the model should read for this request.
#[derive(Clone, Debug)]
pub enum RequestContent {
    Media(MediaReference),
    /// Transcript produced beforehand, e.g. by local Whisper.
    Transcript(String),
}

#[derive(Clone, Debug)]
pub struct SummaryRequest {
    pub task: TaskSelection,
    pub language: Option<TargetLanguage>,
    pub content: RequestContent,
}

impl SummaryRequest {
    pub fn new(task: TaskSelection, content: RequestContent) -> Self {
        Self {
            task,
            language: None,
            content,
        }
    }

    pub fn with_language(mut self, language: Option<TargetLanguage>) -> Self {
        self.language = language;
        self
    }

    pub fn instruction(&self) -> String {
        build_instruction(self.task, self.language)
    }
}

/// Validates the content and maps it to model input. Never touches the network.
pub fn prepare_input<'a>(
    content: &'a RequestContent,
    supports_media: bool,
    client_name: &str,
) -> Result<ModelInput<'a>> {
    let input = match content {
        RequestContent::Media(reference) if reference.is_empty() => {
            return Err(KonspektError::EmptyMedia);
        }
        RequestContent::Transcript(text) if text.trim().is_empty() => {
            return Err(KonspektError::EmptyMedia);
        }
        RequestContent::Media(MediaReference::Url(url)) => {
            let remote = media::resolve_url(url)?;
            if !remote.is_model_readable() {
                return Err(KonspektError::MediaNeedsDownload { url: remote.uri() });
            }
            ModelInput::RemoteMedia { uri: remote.uri() }
        }
        RequestContent::Media(MediaReference::Upload(upload)) => ModelInput::InlineMedia {
            mime: &upload.mime,
            bytes: &upload.bytes,
        },
        RequestContent::Transcript(text) => ModelInput::Transcript(text),
    };

    if input.is_media() && !supports_media {
        return Err(KonspektError::UnsupportedMedia {
            client: client_name.to_string(),
        });
    }

    Ok(input)
}

/// Runs one request against the model and returns its text verbatim.
#[tracing::instrument(skip_all, fields(task = %request.task, client = client.name()))]
pub async fn run<M: GenerativeModel>(client: &M, request: &SummaryRequest) -> Result<ResultText> {
    let input = prepare_input(&request.content, client.supports_media(), client.name())?;
    let generation = GenerationRequest {
        instruction: request.instruction(),
        input,
    };

    tracing::info!(input = generation.input.kind(), "Requesting model output");
    let text = client.generate(&generation).await?;
    tracing::debug!(chars = text.chars().count(), "Model output received");

    Ok(ResultText(text))
}
