use reqwest::Client;
use serde::Deserialize;

use super::Transcriber;
use crate::{
    client::error_from_response,
    error::{KonspektError, Result},
    media::Upload,
    types::{Segment, Transcript},
};

pub const BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "whisper-1";

/// OpenAI's hosted speech-recognition endpoint.
#[derive(Clone, Debug)]
pub struct HostedWhisper {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    segments: Option<Vec<TranscribeSegment>>,
}

#[derive(Debug, Deserialize)]
struct TranscribeSegment {
    start: f64,
    end: f64,
    text: String,
}

impl From<TranscribeResponse> for Transcript {
    fn from(response: TranscribeResponse) -> Self {
        Transcript {
            text: response.text.trim().to_string(),
            segments: response
                .segments
                .unwrap_or_default()
                .into_iter()
                .map(|s| Segment {
                    start: s.start,
                    end: s.end,
                    text: s.text,
                })
                .collect(),
            language: response.language.unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

impl HostedWhisper {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            base_url: BASE_URL.into(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

impl Transcriber for HostedWhisper {
    fn name(&self) -> &str {
        "Whisper (OpenAI)"
    }

    async fn transcribe(&self, upload: &Upload) -> Result<Transcript> {
        if upload.bytes.is_empty() {
            return Err(KonspektError::EmptyMedia);
        }

        let part = reqwest::multipart::Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime)?;

        let form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment")
            .part("file", part);

        tracing::debug!(
            file = %upload.file_name,
            bytes = upload.bytes.len(),
            "Sending transcription request"
        );

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .inspect_err(|e| tracing::debug!(error = %e, "Transcription request failed"))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(error_from_response("OpenAI", status, &headers, &body).into());
        }

        let parsed: TranscribeResponse = serde_json::from_str(&body)?;
        Ok(parsed.into())
    }
}
