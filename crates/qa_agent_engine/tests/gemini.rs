use std::time::Duration;

use pretty_assertions::assert_eq;
use qa_agent_engine::{GeminiClient, GenerationError, ModelClient, ModelRequest, ModelSettings};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/v1beta/models/test-model:generateContent";

fn settings(server: &MockServer) -> ModelSettings {
    ModelSettings {
        base_url: server.uri(),
        model: "test-model".to_string(),
        api_key: Some("test-key".to_string()),
        ..ModelSettings::default()
    }
}

fn text_response(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn returns_candidate_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("[]")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(settings(&server)).expect("client");
    let text = client
        .generate(&ModelRequest::text("hello"))
        .await
        .expect("generate ok");
    assert_eq!(text, "[]");
}

#[tokio::test]
async fn sends_system_instruction_and_schema() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("ok")))
        .mount(&server)
        .await;

    let client = GeminiClient::new(settings(&server)).expect("client");
    let request = ModelRequest {
        prompt: "list tests".to_string(),
        system_instruction: Some("be a QA agent".to_string()),
        temperature: Some(0.1),
        response_schema: Some(json!({"type": "ARRAY"})),
    };
    client.generate(&request).await.expect("generate ok");

    let received = server.received_requests().await.expect("recording on");
    assert_eq!(received.len(), 1);
    let body: Value = serde_json::from_slice(&received[0].body).expect("json body");
    assert_eq!(body["contents"][0]["parts"][0]["text"], "list tests");
    assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be a QA agent");
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    assert_eq!(body["generationConfig"]["responseSchema"], json!({"type": "ARRAY"}));
}

#[tokio::test]
async fn http_error_carries_status_and_body_excerpt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key invalid"))
        .mount(&server)
        .await;

    let client = GeminiClient::new(settings(&server)).expect("client");
    let err = client
        .generate(&ModelRequest::text("hello"))
        .await
        .expect_err("should fail");
    assert_eq!(
        err,
        GenerationError::HttpStatus {
            status: 403,
            message: "API key invalid".to_string(),
        }
    );
}

#[tokio::test]
async fn missing_key_fails_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("x")))
        .expect(0)
        .mount(&server)
        .await;

    let client = GeminiClient::new(ModelSettings {
        api_key: Some("  ".to_string()),
        ..settings(&server)
    })
    .expect("client");
    let err = client
        .generate(&ModelRequest::text("hello"))
        .await
        .expect_err("should fail");
    assert_eq!(err, GenerationError::MissingApiKey);
}

#[tokio::test]
async fn no_candidates_yields_empty_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"promptFeedback": {"blockReason": "SAFETY"}})),
        )
        .mount(&server)
        .await;

    let client = GeminiClient::new(settings(&server)).expect("client");
    let text = client
        .generate(&ModelRequest::text("hello"))
        .await
        .expect("generate ok");
    assert_eq!(text, "");
}

#[tokio::test]
async fn non_json_envelope_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let client = GeminiClient::new(settings(&server)).expect("client");
    let err = client
        .generate(&ModelRequest::text("hello"))
        .await
        .expect_err("should fail");
    assert!(matches!(err, GenerationError::MalformedEnvelope(_)));
}

#[tokio::test]
async fn oversized_response_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response(&"a".repeat(256))))
        .mount(&server)
        .await;

    let client = GeminiClient::new(ModelSettings {
        max_response_bytes: 64,
        ..settings(&server)
    })
    .expect("client");
    let err = client
        .generate(&ModelRequest::text("hello"))
        .await
        .expect_err("should fail");
    assert_eq!(err, GenerationError::TooLarge { max_bytes: 64 });
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_response("late"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = GeminiClient::new(ModelSettings {
        request_timeout: Duration::from_millis(200),
        ..settings(&server)
    })
    .expect("client");
    let err = client
        .generate(&ModelRequest::text("hello"))
        .await
        .expect_err("should time out");
    assert_eq!(err, GenerationError::Timeout);
}
