use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use konspekt_core::{GenerationRequest, GenerativeModel, ModelError, ModelInput};

#[derive(Clone, Debug)]
pub enum Reply {
    Text(String),
    Transient,
    Fail { status: u16, message: String },
}

#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub instruction: String,
    pub input_kind: &'static str,
    pub uri: Option<String>,
    pub mime: Option<String>,
    pub transcript: Option<String>,
}

#[derive(Clone)]
pub struct MockModel {
    pub calls: Arc<Mutex<Vec<RecordedCall>>>,
    replies: Arc<Mutex<VecDeque<Reply>>>,
    default_reply: String,
    supports_media: bool,
}

impl MockModel {
    pub fn new(reply: &str) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            replies: Arc::new(Mutex::new(VecDeque::new())),
            default_reply: reply.to_string(),
            supports_media: true,
        }
    }

    /// Replies in order, then falls back to the default text.
    pub fn scripted(replies: Vec<Reply>) -> Self {
        let mock = Self::new("default reply");
        *mock.replies.lock().unwrap() = replies.into();
        mock
    }

    pub fn text_only(mut self) -> Self {
        self.supports_media = false;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl GenerativeModel for MockModel {
    fn name(&self) -> &str {
        "mock"
    }

    fn supports_media(&self) -> bool {
        self.supports_media
    }

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, ModelError> {
        let (uri, mime, transcript) = match &request.input {
            ModelInput::RemoteMedia { uri } => (Some(uri.clone()), None, None),
            ModelInput::InlineMedia { mime, .. } => (None, Some(mime.to_string()), None),
            ModelInput::Transcript(text) => (None, None, Some(text.to_string())),
        };
        self.calls.lock().unwrap().push(RecordedCall {
            instruction: request.instruction.clone(),
            input_kind: request.input.kind(),
            uri,
            mime,
            transcript,
        });

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Reply::Text(self.default_reply.clone()));

        match reply {
            Reply::Text(text) => Ok(text),
            Reply::Transient => Err(ModelError::Transient {
                provider: "mock".into(),
                status: 429,
                message: "slow down".into(),
                retry_after: Some(Duration::ZERO),
            }),
            Reply::Fail { status, message } => Err(ModelError::Api {
                provider: "mock".into(),
                status,
                message,
            }),
        }
    }
}
