use std::{future::Future, time::Duration};

use serde::Deserialize;

mod chat_completions;
mod gemini;

pub use chat_completions::ChatCompletionsClient;
pub use gemini::{
    BASE_URL as GEMINI_BASE_URL, DEFAULT_MODEL as GEMINI_DEFAULT_MODEL, GeminiClient,
    INLINE_MEDIA_LIMIT,
};

/// One outbound call: the instruction plus whatever the model should read.
#[derive(Clone, Debug)]
pub struct GenerationRequest<'a> {
    pub instruction: String,
    pub input: ModelInput<'a>,
}

#[derive(Clone, Debug)]
pub enum ModelInput<'a> {
    RemoteMedia { uri: String },
    InlineMedia { mime: &'a str, bytes: &'a [u8] },
    Transcript(&'a str),
}

impl ModelInput<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelInput::RemoteMedia { .. } => "remote media",
            ModelInput::InlineMedia { .. } => "inline media",
            ModelInput::Transcript(_) => "transcript",
        }
    }

    pub fn is_media(&self) -> bool {
        !matches!(self, ModelInput::Transcript(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("{provider} is rate limited or unavailable ({status}): {message}")]
    Transient {
        provider: String,
        status: u16,
        message: String,
        retry_after: Option<Duration>,
    },

    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} returned no text: {reason}")]
    EmptyResponse { provider: String, reason: String },

    #[error("{provider} cannot accept {input} input")]
    UnsupportedInput {
        provider: String,
        input: &'static str,
    },

    #[error(
        "Media is {size} bytes ({encoded} once encoded); {provider} accepts at most {limit} \
         bytes inline. Use --transcribe-first for large files"
    )]
    PayloadTooLarge {
        provider: String,
        size: usize,
        encoded: usize,
        limit: usize,
    },
}

impl ModelError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ModelError::Transient { .. })
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ModelError::Transient { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// A hosted text-generation endpoint.
pub trait GenerativeModel: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the model can read remote or inline media instead of a transcript.
    fn supports_media(&self) -> bool;

    fn generate(
        &self,
        request: &GenerationRequest<'_>,
    ) -> impl Future<Output = Result<String, ModelError>> + Send;
}

/// Client for whichever provider was picked at runtime.
#[derive(Clone, Debug)]
pub enum ProviderClient {
    Gemini(GeminiClient),
    ChatCompletions(ChatCompletionsClient),
}

impl GenerativeModel for ProviderClient {
    fn name(&self) -> &str {
        match self {
            ProviderClient::Gemini(client) => client.name(),
            ProviderClient::ChatCompletions(client) => client.name(),
        }
    }

    fn supports_media(&self) -> bool {
        match self {
            ProviderClient::Gemini(client) => client.supports_media(),
            ProviderClient::ChatCompletions(client) => client.supports_media(),
        }
    }

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, ModelError> {
        match self {
            ProviderClient::Gemini(client) => client.generate(request).await,
            ProviderClient::ChatCompletions(client) => client.generate(request).await,
        }
    }
}

/// Pulls a readable message out of `{"error": {"message": ..., "status": ...}}`,
/// the error shape shared by Gemini and OpenAI-compatible APIs.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<ErrorDetail>,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        message: Option<String>,
        status: Option<String>,
        #[serde(rename = "type")]
        kind: Option<String>,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let error = parsed.error?;
    let message = error.message.filter(|m| !m.trim().is_empty())?;
    match error.status.or(error.kind) {
        Some(status) if !status.is_empty() => Some(format!("{} ({})", message, status)),
        _ => Some(message),
    }
}

/// Turns a non-success HTTP response into a [`ModelError`].
pub(crate) fn error_from_response(
    provider: &str,
    status: reqwest::StatusCode,
    headers: &reqwest::header::HeaderMap,
    body: &str,
) -> ModelError {
    let message = extract_error_message(body).unwrap_or_else(|| body.trim().to_string());
    if crate::retry::is_rate_limited(status, body) {
        ModelError::Transient {
            provider: provider.to_string(),
            status: status.as_u16(),
            message,
            retry_after: crate::retry::retry_after(headers),
        }
    } else {
        ModelError::Api {
            provider: provider.to_string(),
            status: status.as_u16(),
            message,
        }
    }
}
