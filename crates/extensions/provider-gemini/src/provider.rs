//! Gemini provider implementation.

use async_trait::async_trait;

use inline_protocols::{
    GenerationParams, ProviderAdapter, ProviderError, ProviderId, ProviderRequest,
};

use crate::client::{GeminiClient, BASE_URL};
use crate::types::*;

/// Suggested models, cheapest last.
pub const DEFAULT_MODELS: &[&str] = &["gemini-pro-vision", "gemini-pro"];

/// Gemini provider for `google` or `google-free`.
pub struct GeminiProvider {
    id: ProviderId,
    client: GeminiClient,
    params: GenerationParams,
}

impl GeminiProvider {
    /// Adapter for `id` at the public endpoint. `None` for non-Google ids.
    pub fn new(id: ProviderId) -> Option<Self> {
        matches!(id, ProviderId::Google | ProviderId::GoogleFree)
            .then(|| Self::with_base_url(id, BASE_URL))
    }

    pub fn with_base_url(id: ProviderId, base_url: impl Into<String>) -> Self {
        Self {
            id,
            client: GeminiClient::new(base_url),
            params: GenerationParams::default(),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = self.client.with_client(client);
        self
    }

    fn build_request(&self, request: &ProviderRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(request.content()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.params.temperature,
                max_output_tokens: self.params.max_tokens,
            },
        }
    }
}

#[async_trait]
impl ProviderAdapter for GeminiProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn invoke(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        let body = self.build_request(request);
        let response = self
            .client
            .generate_content(&request.api_key, &request.model, &body)
            .await?;

        response
            .first_text()
            .map(|t| t.trim().to_string())
            .ok_or_else(|| {
                ProviderError::MalformedResponse(
                    "missing candidates[0].content.parts[0].text".to_string(),
                )
            })
    }

    /// Only the keyed `google` provider lists models.
    async fn list_models(&self, api_key: &str) -> Result<Option<Vec<String>>, ProviderError> {
        if self.id != ProviderId::Google {
            return Ok(None);
        }
        Ok(self.client.list_models(api_key).await?.model_ids())
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
