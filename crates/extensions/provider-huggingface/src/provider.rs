//! Hugging Face provider implementation.

use async_trait::async_trait;
use tracing::debug;

use inline_protocols::{
    GenerationParams, ProviderAdapter, ProviderError, ProviderId, ProviderRequest,
};

use crate::api::{extract_text, InferenceParameters, InferenceRequest};

const BASE_URL: &str = "https://api-inference.huggingface.co";

/// Suggested models, cheapest last.
pub const DEFAULT_MODELS: &[&str] = &[
    "mistralai/Mistral-7B-Instruct-v0.1",
    "meta-llama/Llama-2-7b-chat-hf",
];

/// Hugging Face inference adapter. The bearer header is optional.
pub struct HuggingFaceProvider {
    base_url: String,
    client: reqwest::Client,
    params: GenerationParams,
}

impl HuggingFaceProvider {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
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

    fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url, model)
    }

    fn build_request(&self, request: &ProviderRequest) -> InferenceRequest {
        InferenceRequest {
            inputs: request.content(),
            parameters: InferenceParameters {
                temperature: self.params.temperature,
                max_new_tokens: self.params.max_tokens,
            },
        }
    }
}

impl Default for HuggingFaceProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderAdapter for HuggingFaceProvider {
    fn id(&self) -> ProviderId {
        ProviderId::HuggingFace
    }

    async fn invoke(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        let body = self.build_request(request);
        debug!(
            model = %request.model,
            text_length = request.text.len(),
            "Sending Hugging Face inference request"
        );

        let mut builder = self.client.post(self.model_url(&request.model)).json(&body);
        if !request.api_key.is_empty() {
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

        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        Ok(extract_text(&value).trim().to_string())
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
