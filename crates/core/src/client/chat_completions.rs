use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{GenerationRequest, GenerativeModel, ModelError, ModelInput, error_from_response};

/// OpenAI-compatible `/chat/completions` endpoint. Text in, text out.
#[derive(Clone, Debug)]
pub struct ChatCompletionsClient {
    client: Client,
    provider_name: String,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

impl ChatCompletionsClient {
    pub fn new(
        provider_name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            provider_name: provider_name.into(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn user_content(&self, request: &GenerationRequest<'_>) -> Result<String, ModelError> {
        match &request.input {
            ModelInput::Transcript(text) => Ok(format!("{}\n\n{}", request.instruction, text)),
            other => Err(ModelError::UnsupportedInput {
                provider: self.provider_name.clone(),
                input: other.kind(),
            }),
        }
    }
}

impl GenerativeModel for ChatCompletionsClient {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn supports_media(&self) -> bool {
        false
    }

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, ModelError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: self.user_content(request)?,
            }],
            temperature: 0.3,
        };

        tracing::debug!(
            provider = %self.provider_name,
            model = %self.model,
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::debug!(error = %e, "Chat completion request failed"))?;

        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(error_from_response(
                &self.provider_name,
                status,
                &headers,
                &text,
            ));
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| ModelError::EmptyResponse {
                provider: self.provider_name.clone(),
                reason: format!("unparseable response: {}", e),
            })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::EmptyResponse {
                provider: self.provider_name.clone(),
                reason: "no choices".into(),
            })?;

        choice
            .message
            .content
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ModelError::EmptyResponse {
                provider: self.provider_name.clone(),
                reason: choice
                    .finish_reason
                    .map(|r| format!("finish reason {}", r))
                    .unwrap_or_else(|| "choice had no content".into()),
            })
    }
}
