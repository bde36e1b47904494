use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{GenerationRequest, GenerativeModel, ModelError, ModelInput, error_from_response};

pub const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Request bodies above this size are rejected by the API.
pub const INLINE_MEDIA_LIMIT: usize = 20 * 1024 * 1024;

/// Room left in the request for the JSON envelope and the instruction.
const REQUEST_OVERHEAD: usize = 64 * 1024;

/// Size of `len` bytes once base64-encoded.
pub fn encoded_len(len: usize) -> usize {
    len.div_ceil(3) * 4
}

const PROVIDER: &str = "Gemini";

#[derive(Clone, Debug)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        if !model.trim().is_empty() {
            self.model = model;
        }
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn request_body(request: &GenerationRequest<'_>) -> Result<Value, ModelError> {
        let media_part = match &request.input {
            ModelInput::RemoteMedia { uri } => json!({ "file_data": { "file_uri": uri } }),
            ModelInput::InlineMedia { mime, bytes } => {
                let encoded = encoded_len(bytes.len());
                if encoded + REQUEST_OVERHEAD > INLINE_MEDIA_LIMIT {
                    return Err(ModelError::PayloadTooLarge {
                        provider: PROVIDER.to_string(),
                        size: bytes.len(),
                        encoded,
                        limit: INLINE_MEDIA_LIMIT,
                    });
                }
                json!({
                    "inline_data": {
                        "mime_type": mime,
                        "data": BASE64.encode(bytes)
                    }
                })
            }
            ModelInput::Transcript(text) => json!({ "text": text }),
        };

        Ok(json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [media_part, { "text": request.instruction }]
                }
            ]
        }))
    }
}

impl GenerativeModel for GeminiClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn supports_media(&self) -> bool {
        true
    }

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, ModelError> {
        let body = Self::request_body(request)?;
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        tracing::debug!(
            model = %self.model,
            input = request.input.kind(),
            "Sending Gemini request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::debug!(error = %e, "Gemini request failed"))?;

        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(error_from_response(PROVIDER, status, &headers, &text));
        }

        extract_text(&text)
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

fn empty(reason: impl Into<String>) -> ModelError {
    ModelError::EmptyResponse {
        provider: PROVIDER.to_string(),
        reason: reason.into(),
    }
}

pub(crate) fn extract_text(body: &str) -> Result<String, ModelError> {
    let payload: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| empty(format!("unparseable response: {}", e)))?;

    let Some(candidate) = payload.candidates.into_iter().next() else {
        let reason = payload
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!("prompt blocked: {}", r))
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(empty(reason));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate
            .finish_reason
            .map(|r| format!("finish reason {}", r))
            .unwrap_or_else(|| "candidate had no text".to_string());
        return Err(empty(reason));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_media_goes_first_and_instruction_last() {
        let request = GenerationRequest {
            instruction: "Summarize.".into(),
            input: ModelInput::RemoteMedia {
                uri: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".into(),
            },
        };
        let body = GeminiClient::request_body(&request).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(
            parts[0]["file_data"]["file_uri"],
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
        assert_eq!(parts[1]["text"], "Summarize.");
    }

    #[test]
    fn inline_media_is_base64_encoded() {
        let request = GenerationRequest {
            instruction: "Summarize.".into(),
            input: ModelInput::InlineMedia {
                mime: "audio/mpeg",
                bytes: b"abc",
            },
        };
        let body = GeminiClient::request_body(&request).unwrap();
        let inline = &body["contents"][0]["parts"][0]["inline_data"];
        assert_eq!(inline["mime_type"], "audio/mpeg");
        assert_eq!(inline["data"], "YWJj");
    }

    #[test]
    fn encoded_length_counts_base64_padding() {
        assert_eq!(encoded_len(0), 0);
        assert_eq!(encoded_len(1), 4);
        assert_eq!(encoded_len(3), 4);
        assert_eq!(encoded_len(4), 8);
    }

    #[test]
    fn media_that_only_fits_before_encoding_is_rejected() {
        let bytes = vec![0u8; 16 * 1024 * 1024];
        let request = GenerationRequest {
            instruction: "Summarize.".into(),
            input: ModelInput::InlineMedia {
                mime: "audio/mpeg",
                bytes: &bytes,
            },
        };
        match GeminiClient::request_body(&request) {
            Err(err @ ModelError::PayloadTooLarge { .. }) => {
                assert!(err.to_string().contains("--transcribe-first"));
            }
            other => panic!("expected PayloadTooLarge, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn media_well_under_the_limit_is_accepted() {
        let bytes = vec![0u8; 14 * 1024 * 1024];
        let request = GenerationRequest {
            instruction: "Summarize.".into(),
            input: ModelInput::InlineMedia {
                mime: "audio/mpeg",
                bytes: &bytes,
            },
        };
        assert!(GeminiClient::request_body(&request).is_ok());
    }

    #[test]
    fn oversized_inline_media_is_rejected() {
        let bytes = vec![0u8; INLINE_MEDIA_LIMIT + 1];
        let request = GenerationRequest {
            instruction: "Summarize.".into(),
            input: ModelInput::InlineMedia {
                mime: "video/mp4",
                bytes: &bytes,
            },
        };
        assert!(matches!(
            GeminiClient::request_body(&request),
            Err(ModelError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn text_parts_are_concatenated() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Hello, "},{"text":"world"}]},"finishReason":"STOP"}]}"#;
        assert_eq!(extract_text(body).unwrap(), "Hello, world");
    }

    #[test]
    fn blocked_prompt_is_reported() {
        let body = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let err = extract_text(body).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }
}
