//! Cohere provider implementation.

use async_trait::async_trait;
use tracing::debug;

use inline_protocols::{
    GenerationParams, ProviderAdapter, ProviderError, ProviderId, ProviderRequest,
};

use crate::api::{GenerateRequest, GenerateResponse, ModelList};

const API_URL: &str = "https://api.cohere.ai/v1/generate";

/// Suggested models, cheapest last.
pub const DEFAULT_MODELS: &[&str] = &["command", "command-light"];

/// Cohere generate adapter.
///
/// The free tier sends the bearer header only when a key is configured.
pub struct CohereProvider {
    id: ProviderId,
    api_url: String,
    client: reqwest::Client,
    params: GenerationParams,
}

impl CohereProvider {
    /// Adapter for `cohere` or `cohere-free`. `None` for other ids.
    pub fn new(id: ProviderId) -> Option<Self> {
        matches!(id, ProviderId::Cohere | ProviderId::CohereFree)
            .then(|| Self::with_url(id, API_URL))
    }

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

    /// Sibling `/models` endpoint of the generate URL.
    pub fn models_url(&self) -> String {
        let base = self.api_url.strip_suffix("/generate").unwrap_or(&self.api_url);
        format!("{}/models", base.trim_end_matches('/'))
    }

    fn sends_auth(&self, api_key: &str) -> bool {
        self.id == ProviderId::Cohere || !api_key.is_empty()
    }

    fn build_request(&self, request: &ProviderRequest) -> GenerateRequest {
        GenerateRequest {
            model: request.model.clone(),
            prompt: request.content(),
            temperature: self.params.temperature,
            max_tokens: self.params.max_tokens,
        }
    }
}

#[async_trait]
impl ProviderAdapter for CohereProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn invoke(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        let body = self.build_request(request);
        debug!(
            provider = %self.id,
            model = %body.model,
            text_length = request.text.len(),
            "Sending Cohere generate request"
        );

        let mut builder = self.client.post(&self.api_url).json(&body);
        if self.sends_auth(&request.api_key) {
            builder = builder.bearer_auth(&request.api_key);
        }

        let response = builder
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

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        parsed
            .into_text()
            .map(|t| t.trim().to_string())
            .ok_or_else(|| ProviderError::MalformedResponse("missing generations[0].text".to_string()))
    }

    /// Only the keyed `cohere` provider lists models.
    async fn list_models(&self, api_key: &str) -> Result<Option<Vec<String>>, ProviderError> {
        if self.id != ProviderId::Cohere {
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
        Ok(listed.names())
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
