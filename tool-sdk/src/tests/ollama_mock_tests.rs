//! Mock tests for the Ollama client
//!
//! These tests use WireMock to simulate the generate endpoint.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::OllamaConfig;
    use crate::error::{Retryable, ServiceError};
    use crate::services::ollama::OllamaClient;

    fn create_test_client(mock_server: &MockServer) -> OllamaClient {
        OllamaClient::new(OllamaConfig {
            base_url: mock_server.uri(),
            model: "llama3.2".to_string(),
            temperature: Some(0.2),
            json_mode: true,
            timeout_seconds: 5,
        })
        .expect("Failed to build Ollama client")
    }

    #[tokio::test]
    async fn test_complete_returns_generated_text() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({
                "model": "llama3.2",
                "stream": false,
                "format": "json",
                "options": { "temperature": 0.2 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3.2",
                "response": "{\"destination\": \"Rome\"}",
                "done": true
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let text = client.complete("Plan 3 days in Rome", Duration::from_secs(2)).await.unwrap();

        assert_eq!(text, "{\"destination\": \"Rome\"}");
    }

    #[tokio::test]
    async fn test_missing_model_is_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": "model 'llama3.2' not found, try pulling it first"
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let err = client.complete("hello", Duration::from_secs(2)).await.unwrap_err();

        assert!(matches!(err.root(), ServiceError::NotFound(m) if m.contains("pulling")));
        assert_eq!(err.status_code(), Some(404));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_slow_runtime_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "response": "late", "done": true }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let err = client.complete("hello", Duration::from_millis(50)).await.unwrap_err();

        assert!(matches!(err.root(), ServiceError::Timeout(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = OllamaClient::new(OllamaConfig {
            base_url: "not a url".to_string(),
            ..OllamaConfig::default()
        });
        assert!(matches!(result, Err(ServiceError::Configuration(_))));
    }
}
