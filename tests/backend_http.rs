//! HTTP backends against a mock server

use glow::errors::GlowError;
use glow::generation::{
    parse_routine, routine_schema, GenerationBackend, MistralBackend, OllamaBackend,
};
use glow::types::RoutineKind;
use serde_json::json;
use std::time::Duration;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn routine_content() -> String {
    json!({
        "routine_type": "Morning",
        "target_skin_type": "Normal",
        "steps": [{
            "step_name": "Protection",
            "products": [{
                "name": "SPF50 Fluid",
                "brand": "Glow Lab",
                "description": "Light sunscreen",
                "price_estimation": "25€"
            }],
            "usage_tips": "Reapply every two hours"
        }],
        "global_advice": "Sunscreen every day",
        "total_estimated_budget": "25€"
    })
    .to_string()
}

#[tokio::test]
async fn test_ollama_chat_roundtrip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "qwen2.5:7b-instruct",
            "stream": false,
            "format": {"title": "Routine"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "qwen2.5:7b-instruct",
            "message": {"role": "assistant", "content": routine_content()},
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OllamaBackend::new(&server.uri(), "qwen2.5:7b-instruct", 0.0, Duration::from_secs(5))
        .unwrap();
    let mut schema = routine_schema();
    schema["title"] = json!("Routine");

    let raw = backend.complete_structured("prompt", &schema).await.unwrap();
    let routine = parse_routine(&raw, RoutineKind::Morning).unwrap();
    assert_eq!(routine.steps[0].products[0].name, "SPF50 Fluid");
}

#[tokio::test]
async fn test_ollama_http_error_is_generation_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;

    let backend = OllamaBackend::new(&server.uri(), "m", 0.0, Duration::from_secs(5)).unwrap();
    let err = backend
        .complete_structured("prompt", &routine_schema())
        .await
        .unwrap_err();

    match err {
        GlowError::Generation(message) => assert!(message.contains("model not loaded")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_ollama_health_check() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .mount(&server)
        .await;

    let backend = OllamaBackend::new(&server.uri(), "m", 0.0, Duration::from_secs(5)).unwrap();
    assert!(backend.health_check().await.unwrap());
}

#[tokio::test]
async fn test_mistral_structured_output_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer secret-key"))
        .and(body_partial_json(json!({
            "model": "mistral-large-latest",
            "response_format": {
                "type": "json_schema",
                "json_schema": {"name": "skincare_routine", "strict": true}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cmpl-1",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": routine_content()},
                "finish_reason": "stop"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = MistralBackend::new(
        &server.uri(),
        "mistral-large-latest",
        "secret-key",
        0.0,
        Duration::from_secs(5),
    )
    .unwrap();

    let raw = backend
        .complete_structured("prompt", &routine_schema())
        .await
        .unwrap();
    assert!(parse_routine(&raw, RoutineKind::Morning).is_ok());
}

#[tokio::test]
async fn test_mistral_empty_choices() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let backend =
        MistralBackend::new(&server.uri(), "m", "k", 0.0, Duration::from_secs(5)).unwrap();
    let err = backend
        .complete_structured("prompt", &routine_schema())
        .await
        .unwrap_err();
    assert!(matches!(err, GlowError::Generation(_)));
}

#[tokio::test]
async fn test_mistral_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let backend =
        MistralBackend::new(&server.uri(), "m", "bad", 0.0, Duration::from_secs(5)).unwrap();
    let err = backend
        .complete_structured("prompt", &routine_schema())
        .await
        .unwrap_err();

    match err {
        GlowError::Generation(message) => assert!(message.contains("401")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": {"content": "{}"}}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let backend = OllamaBackend::new(&server.uri(), "m", 0.0, Duration::from_millis(200)).unwrap();
    let err = backend
        .complete_structured("prompt", &routine_schema())
        .await
        .unwrap_err();
    assert!(matches!(err, GlowError::Timeout { duration_ms: 200 }));
}
