    use super::*;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    fn request() -> ProviderRequest {
        ProviderRequest::new("sk-ant-test", "claude-3-haiku-20240307", "helo wrld", "Fix:\n\n")
    }

    #[test]
    fn test_provider_id() {
        assert_eq!(AnthropicProvider::new().id(), ProviderId::Anthropic);
    }

    #[test]
    fn test_default_url() {
        assert_eq!(AnthropicProvider::new().api_url, API_URL);
    }

    #[test]
    fn test_build_request() {
        let provider = AnthropicProvider::new().with_params(GenerationParams {
            temperature: 0.3,
            max_tokens: 1000,
        });
        let body = provider.build_request(&request());
        assert_eq!(body.max_tokens, 1000);
        assert_eq!(body.messages[0].content, "Fix:\n\nhelo wrld");
    }

    #[tokio::test]
    async fn test_invoke_sends_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::header("x-api-key", "sk-ant-test"))
            .and(matchers::header("anthropic-version", "2023-06-01"))
            .and(matchers::body_partial_json(serde_json::json!({
                "model": "claude-3-haiku-20240307",
                "max_tokens": 2000
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1",
                "content": [{"type": "text", "text": "Hello world.\n"}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = AnthropicProvider::with_url(mock_server.uri());
        assert_eq!(provider.invoke(&request()).await.unwrap(), "Hello world.");
    }

    #[tokio::test]
    async fn test_invoke_error_message() {
        let mock_server = MockServer::start().await;

        let error_body = r#"{"type": "error", "error": {"type": "authentication_error", "message": "invalid x-api-key"}}"#;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string(error_body))
            .mount(&mock_server)
            .await;

        let provider = AnthropicProvider::with_url(mock_server.uri());
        let err = provider.invoke(&request()).await.unwrap_err();
        assert_eq!(err.http_status(), Some(401));
        assert_eq!(err.to_string(), "invalid x-api-key");
    }

    #[tokio::test]
    async fn test_invoke_overloaded_without_body() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(529))
            .mount(&mock_server)
            .await;

        let provider = AnthropicProvider::with_url(mock_server.uri());
        let err = provider.invoke(&request()).await.unwrap_err();
        assert_eq!(err.to_string(), "API error: 529");
    }
