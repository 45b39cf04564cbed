//! Provider adapter contract.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, ProviderError};

/// The closed set of supported completion providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderId {
    #[serde(rename = "openai")]
    OpenAI,
    Anthropic,
    Google,
    GoogleFree,
    Mistral,
    Cohere,
    CohereFree,
    Perplexity,
    Groq,
    #[serde(rename = "huggingface")]
    HuggingFace,
    Together,
}

impl ProviderId {
    pub const ALL: [ProviderId; 11] = [
        ProviderId::OpenAI,
        ProviderId::Anthropic,
        ProviderId::Google,
        ProviderId::GoogleFree,
        ProviderId::Mistral,
        ProviderId::Cohere,
        ProviderId::CohereFree,
        ProviderId::Perplexity,
        ProviderId::Groq,
        ProviderId::HuggingFace,
        ProviderId::Together,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ProviderId::OpenAI => "openai",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Google => "google",
            ProviderId::GoogleFree => "google-free",
            ProviderId::Mistral => "mistral",
            ProviderId::Cohere => "cohere",
            ProviderId::CohereFree => "cohere-free",
            ProviderId::Perplexity => "perplexity",
            ProviderId::Groq => "groq",
            ProviderId::HuggingFace => "huggingface",
            ProviderId::Together => "together",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            ProviderId::OpenAI => "OpenAI",
            ProviderId::Anthropic => "Anthropic",
            ProviderId::Google => "Google",
            ProviderId::GoogleFree => "Google Gemini (Free)",
            ProviderId::Mistral => "Mistral",
            ProviderId::Cohere => "Cohere",
            ProviderId::CohereFree => "Cohere (Free)",
            ProviderId::Perplexity => "Perplexity",
            ProviderId::Groq => "Groq",
            ProviderId::HuggingFace => "Hugging Face",
            ProviderId::Together => "Together AI",
        }
    }

    /// Settings key holding this provider's secret.
    pub fn api_key_setting(self) -> String {
        format!("apiKey_{}", self.as_str())
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownProvider(s.to_string()))
    }
}

/// Sampling parameters shared by every adapter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 2000,
        }
    }
}

/// Dispatcher-side request handed to one adapter. Never persisted.
#[derive(Clone)]
pub struct ProviderRequest {
    pub api_key: String,
    pub model: String,
    pub text: String,
    pub prompt: String,
}

impl ProviderRequest {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        text: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            text: text.into(),
            prompt: prompt.into(),
        }
    }

    /// Prompt prefix followed by the user's text.
    pub fn content(&self) -> String {
        format!("{}{}", self.prompt, self.text)
    }
}

impl fmt::Debug for ProviderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRequest")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("text_len", &self.text.len())
            .finish()
    }
}

/// Stateless translator between a [`ProviderRequest`] and one vendor API.
///
/// Implementations build the vendor body and headers, extract the single best
/// completion, and trim it. They never retry.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Provider this adapter serves.
    fn id(&self) -> ProviderId;

    /// Run one completion and return the corrected text.
    async fn invoke(&self, request: &ProviderRequest) -> Result<String, ProviderError>;

    /// Models the vendor lists for `api_key`. `Ok(None)` when this provider
    /// has no listing endpoint.
    async fn list_models(&self, _api_key: &str) -> Result<Option<Vec<String>>, ProviderError> {
        Ok(None)
    }
}
