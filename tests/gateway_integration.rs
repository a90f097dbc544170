//! Integration tests for the chat-completions gateway
//!
//! Runs the real HTTP client against a local mock server.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wattbuddy::config::{Config, LlmConfig, PipelineConfig};
use wattbuddy::llm::{ChatCompletionsClient, LlmGateway};
use wattbuddy::rag::{progress, EventBus, RagPipeline, RunOutcome};
use wattbuddy::repl::ask_once;
use wattbuddy::{AssistantError, Role};

fn llm_config(server: &MockServer) -> LlmConfig {
    LlmConfig {
        endpoint: format!("{}/api/v1/chat/completions", server.uri()),
        model: "test/model".to_string(),
        referer: "http://localhost:8000".to_string(),
        title: "Smart Energy Monitor".to_string(),
        api_key: Some("sk-test".to_string()),
    }
}

fn completion(text: &str) -> serde_json::Value {
    json!({
        "id": "gen-1",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": text } }]
    })
}

#[tokio::test]
async fn test_request_shape_and_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(header("HTTP-Referer", "http://localhost:8000"))
        .and(header("X-Title", "Smart Energy Monitor"))
        .and(body_partial_json(json!({
            "model": "test/model",
            "messages": [
                { "role": "system", "content": "be brief" },
                { "role": "user", "content": "what is my bill?" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("About $145.")))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChatCompletionsClient::from_config(&llm_config(&server)).unwrap();
    let text = client.generate("be brief", "what is my bill?").await.unwrap();
    assert_eq!(text, "About $145.");
}

#[tokio::test]
async fn test_non_success_status_is_service_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let client = ChatCompletionsClient::from_config(&llm_config(&server)).unwrap();
    match client.generate("system", "query").await {
        Err(AssistantError::ServiceError { status, body }) => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("expected service error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unexpected_body_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = ChatCompletionsClient::from_config(&llm_config(&server)).unwrap();
    let result = client.generate("system", "query").await;
    assert!(matches!(result, Err(AssistantError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_http_error() {
    let mut config = LlmConfig {
        api_key: Some("sk-test".to_string()),
        ..LlmConfig::default()
    };
    config.endpoint = "http://127.0.0.1:9/chat/completions".to_string();

    let client = ChatCompletionsClient::from_config(&config).unwrap();
    let result = client.generate("system", "query").await;
    assert!(matches!(result, Err(AssistantError::HttpError(_))));
}

#[tokio::test]
async fn test_pipeline_end_to_end_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "messages": [{ "role": "system" }, { "role": "user", "content": "Is my fridge ok?" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Check the <b>door seal</b>.")))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        llm: llm_config(&server),
        pipeline: PipelineConfig::immediate(),
        ..Config::default()
    };

    let (bus, _events) = EventBus::new();
    let pipeline = RagPipeline::from_config(&config, Arc::new(bus)).unwrap();
    let outcome = pipeline.spawn_query("Is my fridge ok?").unwrap().await.unwrap();

    match outcome {
        RunOutcome::Completed { content, sources, .. } => {
            assert!(content.contains("Check the <b>door seal</b>."));
            assert!(content.contains("Context Sources: 2"));
            assert_eq!(sources, vec!["dev_logs", "tariff"]);
        }
        other => panic!("expected completion, got {:?}", other),
    }

    let messages = pipeline.conversation().all();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].role, Role::Assistant);
}

#[tokio::test]
async fn test_pipeline_service_failure_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let config = Config {
        llm: llm_config(&server),
        pipeline: PipelineConfig::immediate(),
        ..Config::default()
    };

    let (bus, mut events) = EventBus::new();
    let pipeline = RagPipeline::from_config(&config, Arc::new(bus)).unwrap();
    let outcome = pipeline.spawn_query("What is my tariff?").unwrap().await.unwrap();
    assert!(!outcome.is_completed());

    let mut last = None;
    while let Ok(event) = events.try_recv() {
        last = Some(event);
    }
    assert_eq!(last.unwrap().content(), progress::ERROR_MESSAGE);
    assert_eq!(pipeline.conversation().len(), 1);
}

#[tokio::test]
async fn test_ask_once_blank_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let config = Config {
        llm: llm_config(&server),
        pipeline: PipelineConfig::immediate(),
        ..Config::default()
    };

    assert!(ask_once(&config, "   ").await.unwrap().is_none());
}

#[tokio::test]
async fn test_ask_once_answers_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Unplug the consoles.")))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        llm: llm_config(&server),
        pipeline: PipelineConfig::immediate(),
        ..Config::default()
    };

    let outcome = ask_once(&config, "ghost power?").await.unwrap().unwrap();
    assert!(outcome.content().unwrap().contains("Unplug the consoles."));
}
