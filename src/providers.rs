//! Built-in provider adapters.

use std::sync::Arc;

use tracing::{debug, info};

use inline_config::DispatcherConfig;
use inline_dispatcher::{DispatchError, ProviderSet};
use inline_protocols::{GenerationParams, ProviderAdapter, ProviderId};
use inline_provider_anthropic::AnthropicProvider;
use inline_provider_cohere::CohereProvider;
use inline_provider_gemini::GeminiProvider;
use inline_provider_huggingface::HuggingFaceProvider;
use inline_provider_openai::OpenAIProvider;

/// Build one adapter per supported provider id, sharing an HTTP client.
pub(crate) fn build_provider_set(config: &DispatcherConfig) -> anyhow::Result<ProviderSet> {
    let client = reqwest::Client::builder()
        .connect_timeout(config.connect_timeout())
        .build()?;
    let params = config.generation();

    let providers = ProviderSet::new();
    for id in ProviderId::ALL {
        let adapter = adapter_for(id, params, &client)
            .ok_or_else(|| DispatchError::UnknownProvider(id.to_string()))?;
        providers.register(adapter)?;
        debug!(provider = %id, "Registered provider");
    }

    info!("Registered {} providers", providers.len());
    Ok(providers)
}

fn adapter_for(
    id: ProviderId,
    params: GenerationParams,
    client: &reqwest::Client,
) -> Option<Arc<dyn ProviderAdapter>> {
    let client = client.clone();
    let adapter: Arc<dyn ProviderAdapter> = match id {
        ProviderId::Anthropic => Arc::new(
            AnthropicProvider::new()
                .with_params(params)
                .with_client(client),
        ),
        ProviderId::Google | ProviderId::GoogleFree => Arc::new(
            GeminiProvider::new(id)?
                .with_params(params)
                .with_client(client),
        ),
        ProviderId::Cohere | ProviderId::CohereFree => Arc::new(
            CohereProvider::new(id)?
                .with_params(params)
                .with_client(client),
        ),
        ProviderId::HuggingFace => Arc::new(
            HuggingFaceProvider::new()
                .with_params(params)
                .with_client(client),
        ),
        _ => Arc::new(OpenAIProvider::new(id)?.with_params(params).with_client(client)),
    };
    Some(adapter)
}

/// Suggested models for `provider`, cheapest last.
pub(crate) fn suggested_models(provider: ProviderId) -> &'static [&'static str] {
    match provider {
        ProviderId::Anthropic => inline_provider_anthropic::DEFAULT_MODELS,
        ProviderId::Google | ProviderId::GoogleFree => inline_provider_gemini::DEFAULT_MODELS,
        ProviderId::Cohere | ProviderId::CohereFree => inline_provider_cohere::DEFAULT_MODELS,
        ProviderId::HuggingFace => inline_provider_huggingface::DEFAULT_MODELS,
        _ => inline_provider_openai::default_models(provider),
    }
}

/// Where a model list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ModelSource {
    /// The provider's models endpoint.
    Listed,
    /// The built-in suggestions.
    Suggested,
}

/// Models to offer for `provider`.
///
/// With a key, the provider's own listing is tried first. Providers without
/// a listing endpoint, listing failures and empty listings all fall back to
/// the suggested models.
pub(crate) async fn available_models(
    providers: &ProviderSet,
    provider: ProviderId,
    api_key: Option<&str>,
) -> (Vec<String>, ModelSource) {
    let api_key = api_key.map(str::trim).filter(|k| !k.is_empty());
    if let (Some(api_key), Some(adapter)) = (api_key, providers.get(provider)) {
        match adapter.list_models(api_key).await {
            Ok(Some(models)) if !models.is_empty() => return (models, ModelSource::Listed),
            Ok(_) => {}
            Err(e) => debug!(provider = %provider, "Could not list models, using suggestions: {}", e),
        }
    }
    let suggested = suggested_models(provider)
        .iter()
        .map(|m| m.to_string())
        .collect();
    (suggested, ModelSource::Suggested)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_provider_registered() {
        let providers = build_provider_set(&DispatcherConfig::default()).unwrap();
        assert_eq!(providers.len(), ProviderId::ALL.len());
        for id in ProviderId::ALL {
            let adapter = providers.resolve(id.as_str()).unwrap();
            assert_eq!(adapter.id(), id);
        }
    }

    #[test]
    fn test_every_provider_has_suggested_models() {
        for id in ProviderId::ALL {
            assert!(!suggested_models(id).is_empty(), "{} has no models", id);
        }
    }

    #[test]
    fn test_free_tiers_share_models() {
        assert_eq!(
            suggested_models(ProviderId::Google),
            suggested_models(ProviderId::GoogleFree)
        );
        assert_eq!(
            suggested_models(ProviderId::Cohere),
            suggested_models(ProviderId::CohereFree)
        );
    }

    mod listing {
        use super::*;
        use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

        async fn openai_at(server: &MockServer) -> ProviderSet {
            let url = format!("{}/v1/chat/completions", server.uri());
            let providers = ProviderSet::new();
            providers
                .register(Arc::new(OpenAIProvider::with_url(ProviderId::OpenAI, url)))
                .unwrap();
            providers
        }

        #[tokio::test]
        async fn test_listed_models_win() {
            let server = MockServer::start().await;
            Mock::given(matchers::method("GET"))
                .and(matchers::path("/v1/models"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "data": [{"id": "gpt-4o"}, {"id": "dall-e-3"}]
                })))
                .expect(1)
                .mount(&server)
                .await;

            let providers = openai_at(&server).await;
            let (models, source) =
                available_models(&providers, ProviderId::OpenAI, Some("sk-test")).await;
            assert_eq!(models, vec!["gpt-4o".to_string()]);
            assert_eq!(source, ModelSource::Listed);
        }

        #[tokio::test]
        async fn test_listing_failure_falls_back() {
            let server = MockServer::start().await;
            Mock::given(matchers::method("GET"))
                .respond_with(ResponseTemplate::new(500))
                .expect(1)
                .mount(&server)
                .await;

            let providers = openai_at(&server).await;
            let (models, source) =
                available_models(&providers, ProviderId::OpenAI, Some("sk-test")).await;
            assert_eq!(models, suggested_models(ProviderId::OpenAI));
            assert_eq!(source, ModelSource::Suggested);
        }

        #[tokio::test]
        async fn test_empty_listing_falls_back() {
            let server = MockServer::start().await;
            Mock::given(matchers::method("GET"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(serde_json::json!({"data": [{"id": "whisper-1"}]})),
                )
                .mount(&server)
                .await;

            let providers = openai_at(&server).await;
            let (_, source) =
                available_models(&providers, ProviderId::OpenAI, Some("sk-test")).await;
            assert_eq!(source, ModelSource::Suggested);
        }

        #[tokio::test]
        async fn test_no_key_skips_listing() {
            let server = MockServer::start().await;
            Mock::given(matchers::method("GET"))
                .respond_with(ResponseTemplate::new(200))
                .expect(0)
                .mount(&server)
                .await;

            let providers = openai_at(&server).await;
            let (models, source) = available_models(&providers, ProviderId::OpenAI, Some(" ")).await;
            assert_eq!(models, suggested_models(ProviderId::OpenAI));
            assert_eq!(source, ModelSource::Suggested);
        }
    }
}
