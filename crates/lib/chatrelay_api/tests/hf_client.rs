//! Upstream client tests against a mock Hugging Face endpoint.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chatrelay_api::config::ApiConfig;
use chatrelay_api::services::hf::{GenerationParams, HfClient, InferenceClient, UpstreamError};

fn config_for(server_uri: &str) -> ApiConfig {
    ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        hf_api_key: "secret-token".into(),
        model_url: format!("{server_uri}/models/test").parse().unwrap(),
        allowed_origins: vec!["*".into()],
        rate_limit_window: Duration::from_secs(900),
        rate_limit_max_requests: 100,
        upstream_timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn sends_bearer_auth_and_generation_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/test"))
        .and(header("authorization", "Bearer secret-token"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "inputs": "ping",
            "parameters": {"max_length": 500, "temperature": 0.7}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"generated_text": "pong"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = HfClient::from_config(&config_for(&server.uri())).unwrap();
    let generations = client
        .generate("ping", &GenerationParams::default())
        .await
        .unwrap();

    assert_eq!(generations.len(), 1);
    assert_eq!(generations[0].generated_text.as_deref(), Some("pong"));
}

#[tokio::test]
async fn non_success_status_surfaces_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/test"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"error": "model loading"})),
        )
        .mount(&server)
        .await;

    let client = HfClient::from_config(&config_for(&server.uri())).unwrap();
    let err = client
        .generate("ping", &GenerationParams::default())
        .await
        .unwrap_err();

    match &err {
        UpstreamError::Status { status, body } => {
            assert_eq!(status.as_u16(), 503);
            assert!(body.contains("model loading"), "{body}");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert_eq!(err.detail(), "model loading");
}

#[tokio::test]
async fn undecodable_success_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = HfClient::from_config(&config_for(&server.uri())).unwrap();
    let err = client
        .generate("ping", &GenerationParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, UpstreamError::Decode { .. }), "{err:?}");
}

#[tokio::test]
async fn missing_generated_text_field_still_decodes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{}])))
        .mount(&server)
        .await;

    let client = HfClient::from_config(&config_for(&server.uri())).unwrap();
    let generations = client
        .generate("ping", &GenerationParams::default())
        .await
        .unwrap();

    assert_eq!(generations.len(), 1);
    assert!(generations[0].generated_text.is_none());
}
