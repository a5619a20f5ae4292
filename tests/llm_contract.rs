//! Chat-completions client contract tests.
//!
//! Verify the request shape sent to an OpenAI-compatible server and the
//! mapping of every failure mode to `ScoutError::Llm`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use industry_scout::ScoutError;
use industry_scout::llm::ChatClient;
use industry_scout::prompts::REPORT_TEMPLATE;
use industry_scout::services::{Judge, Summarize};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "llama3:instruct",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

fn client(server: &MockServer) -> ChatClient {
    ChatClient::new("llama3:instruct")
        .with_base_url(server.uri())
        .with_timeout(Duration::from_secs(2))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_request_is_single_user_message_without_streaming() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "model": "llama3:instruct",
            "messages": [{"role": "user", "content": "Hello"}],
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("  Hi there \n")))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server).complete("Hello").await.unwrap();
    assert_eq!(reply, "Hi there");
}

#[tokio::test]
async fn test_summarize_sends_industry_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("venture_capital"))
        .and(body_string_contains("Seed rounds grew"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Reliable: Yes")))
        .expect(1)
        .mount(&server)
        .await;

    let summary = client(&server)
        .summarize("Seed rounds grew 12% in 2023.", "venture_capital")
        .await
        .unwrap();
    assert_eq!(summary, "Reliable: Yes");
}

#[tokio::test]
async fn test_judge_sends_template() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("Yes/No"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "{\"url\": \"https://a.com\", \"reliable\": \"Yes\", \"reason\": \"ok\"}",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let verdict = client(&server)
        .judge("URL: https://a.com\n\nGood.", "energy", REPORT_TEMPLATE)
        .await
        .unwrap();
    assert!(verdict.contains("\"reliable\": \"Yes\""));
}

#[tokio::test]
async fn test_http_error_maps_to_llm_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "model 'llama3:instruct' not found"})),
        )
        .mount(&server)
        .await;

    let err = client(&server).complete("Hello").await.unwrap_err();
    match err {
        ScoutError::Llm(message) => {
            assert!(message.contains("404"));
            assert!(message.contains("not found"));
        }
        other => panic!("expected Llm error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_content_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = client(&server).complete("Hello").await.unwrap_err();
    assert!(matches!(err, ScoutError::Llm(_)));
}

#[tokio::test]
async fn test_empty_content_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("   ")))
        .mount(&server)
        .await;

    let err = client(&server).complete("Hello").await.unwrap_err();
    assert!(matches!(err, ScoutError::Llm(_)));
}

#[tokio::test]
async fn test_malformed_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let err = client(&server).complete("Hello").await.unwrap_err();
    assert!(err.to_string().contains("malformed LLM response"));
}

#[tokio::test]
async fn test_timeout_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("late"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = ChatClient::new("llama3:instruct")
        .with_base_url(server.uri())
        .with_timeout(Duration::from_millis(300))
        .build()
        .unwrap();
    let err = client.complete("Hello").await.unwrap_err();
    assert!(err.to_string().contains("timed out"));
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn test_temperature_is_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"temperature": 0.5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChatClient::new("llama3:instruct")
        .with_base_url(server.uri())
        .with_temperature(0.5)
        .build()
        .unwrap();
    assert_eq!(client.complete("Hello").await.unwrap(), "ok");
}
