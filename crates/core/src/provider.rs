use crate::{
    client::{
        ChatCompletionsClient, GEMINI_BASE_URL, GEMINI_DEFAULT_MODEL, GeminiClient, ProviderClient,
    },
    credentials::Credentials,
    error::{KonspektError, Result},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Provider {
    #[default]
    Gemini,
    Openai,
    Grok,
}

pub struct ProviderConfig {
    pub api_url: &'static str,
    pub model: &'static str,
    pub env_var: &'static str,
}

impl Provider {
    pub fn config(&self) -> ProviderConfig {
        match self {
            Provider::Gemini => ProviderConfig {
                api_url: GEMINI_BASE_URL,
                model: GEMINI_DEFAULT_MODEL,
                env_var: "GEMINI_API_KEY",
            },
            Provider::Openai => ProviderConfig {
                api_url: "https://api.openai.com/v1",
                model: "gpt-4o-mini",
                env_var: "OPENAI_API_KEY",
            },
            Provider::Grok => ProviderConfig {
                api_url: "https://api.x.ai/v1",
                model: "grok-4-fast",
                env_var: "XAI_API_KEY",
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gemini => "Gemini",
            Provider::Openai => "OpenAI",
            Provider::Grok => "Grok",
        }
    }

    /// Key used in the credentials file and on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::Openai => "openai",
            Provider::Grok => "grok",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        [Provider::Gemini, Provider::Openai, Provider::Grok]
            .into_iter()
            .find(|p| p.id().eq_ignore_ascii_case(id.trim()))
    }

    /// Resolves the API key: explicit value, then environment, then stored credential.
    pub fn resolve_api_key(
        &self,
        explicit: Option<&str>,
        stored: &Credentials,
    ) -> Result<String> {
        let env_value = std::env::var(self.config().env_var).ok();
        let key = explicit
            .map(str::to_string)
            .or(env_value)
            .or_else(|| stored.get(*self).map(str::to_string))
            .ok_or_else(|| KonspektError::MissingApiKey {
                provider: self.id().to_string(),
                env_var: self.config().env_var.to_string(),
            })?;
        self.validate_api_key(&key)?;
        Ok(key.trim().to_string())
    }

    /// Rejects keys that cannot possibly be valid.
    pub fn validate_api_key(&self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(KonspektError::MissingApiKey {
                provider: self.id().to_string(),
                env_var: self.config().env_var.to_string(),
            });
        }
        if key.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(KonspektError::InvalidApiKey {
                provider: self.name().to_string(),
            });
        }
        Ok(())
    }

    pub fn client(&self, api_key: &str, model: Option<&str>) -> ProviderClient {
        let config = self.config();
        let model = model.unwrap_or(config.model);
        match self {
            Provider::Gemini => {
                ProviderClient::Gemini(GeminiClient::new(api_key).with_model(model))
            }
            Provider::Openai | Provider::Grok => ProviderClient::ChatCompletions(
                ChatCompletionsClient::new(self.name(), config.api_url, api_key, model),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::GenerativeModel;

    #[test]
    fn explicit_key_wins() {
        let mut stored = Credentials::default();
        stored.set(Provider::Grok, "stored-key");
        let key = Provider::Grok
            .resolve_api_key(Some(" explicit-key "), &stored)
            .unwrap();
        assert_eq!(key, "explicit-key");
    }

    #[test]
    fn blank_and_malformed_keys_are_rejected() {
        assert!(matches!(
            Provider::Gemini.validate_api_key("   "),
            Err(KonspektError::MissingApiKey { .. })
        ));
        assert!(matches!(
            Provider::Gemini.validate_api_key("abc def"),
            Err(KonspektError::InvalidApiKey { .. })
        ));
        assert!(Provider::Gemini.validate_api_key("AIzaSyExample").is_ok());
    }

    #[test]
    fn ids_round_trip() {
        for provider in [Provider::Gemini, Provider::Openai, Provider::Grok] {
            assert_eq!(Provider::from_id(provider.id()), Some(provider));
        }
        assert_eq!(Provider::from_id("claude"), None);
    }

    #[test]
    fn only_gemini_reads_media() {
        assert!(Provider::Gemini.client("k", None).supports_media());
        assert!(!Provider::Openai.client("k", None).supports_media());
        assert!(!Provider::Grok.client("k", Some("grok-3")).supports_media());
    }
}
