use super::*;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

fn request(key: &str) -> ProviderRequest {
    ProviderRequest::new(key, "command-light", "helo wrld", "Fix:\n\n")
}

fn generation(text: &str) -> serde_json::Value {
    serde_json::json!({"id": "gen-1", "generations": [{"id": "a", "text": text}]})
}

#[test]
fn test_new_cohere_ids_only() {
    assert!(CohereProvider::new(ProviderId::Cohere).is_some());
    assert!(CohereProvider::new(ProviderId::CohereFree).is_some());
    assert!(CohereProvider::new(ProviderId::Google).is_none());
}

#[test]
fn test_auth_policy() {
    let paid = CohereProvider::with_url(ProviderId::Cohere, "http://localhost");
    let free = CohereProvider::with_url(ProviderId::CohereFree, "http://localhost");
    assert!(paid.sends_auth(""));
    assert!(!free.sends_auth(""));
    assert!(free.sends_auth("co-key"));
}

#[test]
fn test_build_request_concatenates_prompt() {
    let provider = CohereProvider::with_url(ProviderId::Cohere, "http://localhost");
    let body = provider.build_request(&request("k"));
    assert_eq!(body.prompt, "Fix:\n\nhelo wrld");
    assert_eq!(body.max_tokens, 2000);
}

#[tokio::test]
async fn test_invoke_success() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::header("authorization", "Bearer co-key"))
        .and(matchers::body_partial_json(serde_json::json!({
            "model": "command-light",
            "prompt": "Fix:\n\nhelo wrld"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(generation("\nHello world.  ")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = CohereProvider::with_url(ProviderId::Cohere, mock_server.uri());
    assert_eq!(provider.invoke(&request("co-key")).await.unwrap(), "Hello world.");
}

#[tokio::test]
async fn test_free_tier_without_key_sends_no_auth() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::header_exists("authorization"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(generation("ok")))
        .mount(&mock_server)
        .await;

    let provider = CohereProvider::with_url(ProviderId::CohereFree, mock_server.uri());
    assert_eq!(provider.invoke(&request("")).await.unwrap(), "ok");
}

#[tokio::test]
async fn test_invoke_error_message() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"error": {"message": "invalid model"}})),
        )
        .mount(&mock_server)
        .await;

    let provider = CohereProvider::with_url(ProviderId::Cohere, mock_server.uri());
    let err = provider.invoke(&request("k")).await.unwrap_err();
    assert_eq!(err.to_string(), "invalid model");
}

#[test]
fn test_models_url() {
    let provider = CohereProvider::new(ProviderId::Cohere).unwrap();
    assert_eq!(provider.models_url(), "https://api.cohere.ai/v1/models");
}

#[tokio::test]
async fn test_list_models() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .and(matchers::path("/v1/models"))
        .and(matchers::header("authorization", "Bearer co-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "models": [
                {"name": "command-r", "endpoints": ["chat"]},
                {"name": "command-light", "endpoints": ["generate"]}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/v1/generate", mock_server.uri());
    let provider = CohereProvider::with_url(ProviderId::Cohere, url);
    assert_eq!(
        provider.list_models("co-key").await.unwrap(),
        Some(vec!["command-r".to_string(), "command-light".to_string()])
    );
}

#[tokio::test]
async fn test_free_tier_does_not_list() {
    let provider = CohereProvider::with_url(ProviderId::CohereFree, "http://127.0.0.1:1");
    assert_eq!(provider.list_models("").await.unwrap(), None);
}
