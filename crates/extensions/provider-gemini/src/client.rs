//! Gemini API client.

use reqwest::Client;
use tracing::debug;

use inline_protocols::ProviderError;

use crate::types::*;

pub(crate) const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API client.
pub struct GeminiClient {
    client: Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Generate content (non-streaming). The key travels in the query string.
    pub async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        debug!("Gemini generate_content: model={}", model);

        let mut builder = self.client.post(&url).json(request);
        if !api_key.is_empty() {
            builder = builder.query(&[("key", api_key)]);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ProviderError::from_api_response(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::MalformedResponse(e.to_string()))
    }

    /// List the models visible to `api_key`.
    pub async fn list_models(&self, api_key: &str) -> Result<ListModelsResponse, ProviderError> {
        let url = format!("{}/models", self.base_url);

        debug!("Gemini list_models");

        let response = self
            .client
            .get(&url)
            .query(&[("key", api_key)])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ProviderError::from_api_response(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::MalformedResponse(e.to_string()))
    }
}
