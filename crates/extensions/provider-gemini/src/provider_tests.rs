use super::*;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

fn request(key: &str) -> ProviderRequest {
    ProviderRequest::new(key, "gemini-pro", "helo wrld", "Fix:\n\n")
}

#[test]
fn test_new_google_ids_only() {
    assert_eq!(GeminiProvider::new(ProviderId::Google).unwrap().id(), ProviderId::Google);
    assert_eq!(
        GeminiProvider::new(ProviderId::GoogleFree).unwrap().id(),
        ProviderId::GoogleFree
    );
    assert!(GeminiProvider::new(ProviderId::OpenAI).is_none());
}

#[test]
fn test_build_request() {
    let provider = GeminiProvider::new(ProviderId::Google).unwrap();
    let body = provider.build_request(&request("k"));
    assert_eq!(body.contents[0].parts[0].text.as_deref(), Some("Fix:\n\nhelo wrld"));
    assert_eq!(body.generation_config.max_output_tokens, 2000);
}

#[tokio::test]
async fn test_invoke_key_in_query() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/models/gemini-pro:generateContent"))
        .and(matchers::query_param("key", "g-key"))
        .and(matchers::body_partial_json(serde_json::json!({
            "generationConfig": {"maxOutputTokens": 2000}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": " Hello world. \n"}]}}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = GeminiProvider::with_base_url(ProviderId::Google, mock_server.uri());
    assert_eq!(provider.invoke(&request("g-key")).await.unwrap(), "Hello world.");
}

#[tokio::test]
async fn test_invoke_error_message() {
    let mock_server = MockServer::start().await;

    let error_body = r#"{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string(error_body))
        .mount(&mock_server)
        .await;

    let provider = GeminiProvider::with_base_url(ProviderId::GoogleFree, mock_server.uri());
    let err = provider.invoke(&request("bad")).await.unwrap_err();
    assert_eq!(err.http_status(), Some(400));
    assert_eq!(err.to_string(), "API key not valid");
}

#[tokio::test]
async fn test_invoke_blocked_response_is_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{"finishReason": "SAFETY"}]
        })))
        .mount(&mock_server)
        .await;

    let provider = GeminiProvider::with_base_url(ProviderId::Google, mock_server.uri());
    let err = provider.invoke(&request("k")).await.unwrap_err();
    assert!(matches!(err, ProviderError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_list_models_key_in_query() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .and(matchers::path("/models"))
        .and(matchers::query_param("key", "g-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "models": [
                {"name": "models/gemini-1.5-flash", "displayName": "Gemini 1.5 Flash"},
                {"name": "models/gemini-pro"}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = GeminiProvider::with_base_url(ProviderId::Google, mock_server.uri());
    let models = provider.list_models("g-key").await.unwrap();
    assert_eq!(
        models,
        Some(vec!["gemini-1.5-flash".to_string(), "gemini-pro".to_string()])
    );
}

#[tokio::test]
async fn test_free_tier_does_not_list() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let provider = GeminiProvider::with_base_url(ProviderId::GoogleFree, mock_server.uri());
    assert_eq!(provider.list_models("").await.unwrap(), None);
}
