//! OpenAI-compatible provider implementation.

use async_trait::async_trait;
use tracing::debug;

use inline_protocols::{
    GenerationParams, ProviderAdapter, ProviderError, ProviderId, ProviderRequest,
};

use crate::api::{ChatMessage, ChatRequest, ChatResponse, ModelList};

/// Providers speaking the OpenAI chat completion format.
pub const FAMILY: [ProviderId; 5] = [
    ProviderId::OpenAI,
    ProviderId::Mistral,
    ProviderId::Perplexity,
    ProviderId::Groq,
    ProviderId::Together,
];

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const MISTRAL_API_URL: &str = "https://api.mistral.ai/v1/chat/completions";
const PERPLEXITY_API_URL: &str = "https://api.perplexity.ai/chat/completions";
const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const TOGETHER_API_URL: &str = "https://api.together.xyz/v1/chat/completions";

/// Listed ids are kept only when they name a chat model family.
const CHAT_MODEL_MARKERS: [&str; 5] = ["gpt", "claude", "mistral", "llama", "sonar"];

/// Chat completion adapter for one member of [`FAMILY`].
pub struct OpenAIProvider {
    id: ProviderId,
    api_url: String,
    client: reqwest::Client,
    params: GenerationParams,
}

impl OpenAIProvider {
    /// Adapter for `id` at its public endpoint. `None` outside [`FAMILY`].
    pub fn new(id: ProviderId) -> Option<Self> {
        Self::default_url(id).map(|url| Self::with_url(id, url))
    }

    /// Create provider with custom API URL.
    pub fn with_url(id: ProviderId, api_url: impl Into<String>) -> Self {
        Self {
            id,
            api_url: api_url.into(),
            client: reqwest::Client::new(),
            params: GenerationParams::default(),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn default_url(id: ProviderId) -> Option<&'static str> {
        match id {
            ProviderId::OpenAI => Some(OPENAI_API_URL),
            ProviderId::Mistral => Some(MISTRAL_API_URL),
            ProviderId::Perplexity => Some(PERPLEXITY_API_URL),
            ProviderId::Groq => Some(GROQ_API_URL),
            ProviderId::Together => Some(TOGETHER_API_URL),
            _ => None,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Sibling `/models` endpoint of the chat completion URL.
    pub fn models_url(&self) -> String {
        let base = self
            .api_url
            .strip_suffix("/chat/completions")
            .unwrap_or(&self.api_url);
        format!("{}/models", base.trim_end_matches('/'))
    }

    /// Groq and Together are used on their free tiers and keep the
    /// suggested list.
    fn lists_models(&self) -> bool {
        matches!(
            self.id,
            ProviderId::OpenAI | ProviderId::Mistral | ProviderId::Perplexity
        )
    }

    fn build_request(&self, request: &ProviderRequest) -> ChatRequest {
        ChatRequest {
            model: request.model.clone(),
            messages: vec![ChatMessage::user(request.content())],
            temperature: self.params.temperature,
            max_tokens: self.params.max_tokens,
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAIProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn invoke(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        let body = self.build_request(request);
        debug!(
            provider = %self.id,
            model = %body.model,
            text_length = request.text.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&request.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ProviderError::from_api_response(status.as_u16(), &text));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        parsed
            .into_text()
            .map(|t| t.trim().to_string())
            .ok_or_else(|| {
                ProviderError::MalformedResponse("missing choices[0].message.content".to_string())
            })
    }

    async fn list_models(&self, api_key: &str) -> Result<Option<Vec<String>>, ProviderError> {
        if !self.lists_models() {
            return Ok(None);
        }
        let url = self.models_url();
        debug!(provider = %self.id, url = %url, "Listing models");

        let response = self
            .client
            .get(&url)
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ProviderError::from_api_response(status.as_u16(), &text));
        }

        let listed: ModelList = serde_json::from_str(&text)
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        let models = listed
            .data
            .into_iter()
            .map(|m| m.id)
            .filter(|id| CHAT_MODEL_MARKERS.iter().any(|marker| id.contains(marker)))
            .collect();
        Ok(Some(models))
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
