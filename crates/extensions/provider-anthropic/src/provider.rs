//! Anthropic provider implementation.

use async_trait::async_trait;
use tracing::debug;

use inline_protocols::{
    GenerationParams, ProviderAdapter, ProviderError, ProviderId, ProviderRequest,
};

use crate::api::{ApiMessage, ApiRequest};
use crate::parser::parse_response;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Anthropic Messages API adapter.
pub struct AnthropicProvider {
    api_url: String,
    client: reqwest::Client,
    params: GenerationParams,
}

impl AnthropicProvider {
    pub fn new() -> Self {
        Self::with_url(API_URL)
    }

    pub fn with_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            client: reqwest::Client::new(),
            params: GenerationParams::default(),
        }
    }

    /// Only `max_tokens` is sent; the API default temperature is kept.
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn build_request(&self, request: &ProviderRequest) -> ApiRequest {
        ApiRequest {
            model: request.model.clone(),
            max_tokens: self.params.max_tokens,
            messages: vec![ApiMessage {
                role: "user".to_string(),
                content: request.content(),
            }],
        }
    }
}

impl Default for AnthropicProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    async fn invoke(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        let body = self.build_request(request);
        debug!(
            model = %body.model,
            text_length = request.text.len(),
            "Sending Anthropic messages request"
        );

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &request.api_key)
            .header("anthropic-version", API_VERSION)
            .header("anthropic-dangerous-direct-browser-access", "true")
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

        parse_response(&text)
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
