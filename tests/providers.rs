// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the LLM backends.
//!
//! Uses `wiremock` to mock HTTP endpoints so no real LLM servers are needed.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use git_ac::config::{Config, OllamaConfig, OpenAiConfig, Provider};
use git_ac::domain::{GenerationRequest, SamplingProfile};
use git_ac::error::Error;
use git_ac::services::llm::LlmProvider;
use git_ac::services::llm::ollama::OllamaProvider;
use git_ac::services::llm::openai::OpenAiProvider;
use git_ac::services::pipeline::CommitPipeline;

// ─── Test helpers ────────────────────────────────────────────────────────────

const API_KEY: &str = "test-key-12345";

fn ollama_config(server_url: &str) -> Config {
    Config {
        provider: Provider::Ollama,
        timeout_secs: 5,
        ollama: OllamaConfig {
            host: server_url.to_string(),
            model: "qwen3:4b".into(),
        },
        ..Config::default()
    }
}

fn openai_config(server_url: &str) -> Config {
    Config {
        provider: Provider::OpenAI,
        timeout_secs: 5,
        openai: OpenAiConfig {
            base_url: server_url.to_string(),
            api_key: Some(API_KEY.into()),
            model: "gpt-4o-mini".into(),
        },
        ..Config::default()
    }
}

fn compose_request(prompt: &str) -> GenerationRequest {
    GenerationRequest::new(prompt.into(), SamplingProfile::Compose, 4096)
}

fn chat_completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

async fn mount_tags(server: &MockServer, models: &[&str]) {
    let models: Vec<_> = models
        .iter()
        .map(|name| serde_json::json!({ "name": name }))
        .collect();

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "models": models })))
        .mount(server)
        .await;
}

async fn openai_status(status: u16, body: &str) -> Error {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new(&openai_config(&server.uri())).unwrap();
    provider
        .generate(&compose_request("test prompt"), CancellationToken::new())
        .await
        .unwrap_err()
}

// ─── Ollama health check ─────────────────────────────────────────────────────

#[tokio::test]
async fn ollama_health_check_success() {
    let server = MockServer::start().await;
    mount_tags(&server, &["qwen3:4b", "llama3:8b"]).await;

    let provider = OllamaProvider::new(&ollama_config(&server.uri())).unwrap();
    provider.health_check().await.unwrap();

    let models = provider.list_models().await.unwrap();
    assert_eq!(models, vec!["qwen3:4b".to_string(), "llama3:8b".to_string()]);
}

#[tokio::test]
async fn ollama_health_check_accepts_latest_tag() {
    let server = MockServer::start().await;
    mount_tags(&server, &["llama2:latest"]).await;

    let mut config = ollama_config(&server.uri());
    config.ollama.model = "llama2".into();

    let provider = OllamaProvider::new(&config).unwrap();
    provider.health_check().await.unwrap();
}

#[tokio::test]
async fn ollama_health_check_connection_refused() {
    // Use a port that is almost certainly not listening
    let provider = OllamaProvider::new(&ollama_config("http://127.0.0.1:1")).unwrap();
    let err = provider.health_check().await.unwrap_err();

    match err {
        Error::Connectivity { endpoint, hint } => {
            assert_eq!(endpoint, "http://127.0.0.1:1");
            assert!(hint.contains("ollama serve"), "hint was: {hint}");
        }
        other => panic!("expected Connectivity, got: {other:?}"),
    }
}

#[tokio::test]
async fn ollama_model_not_found_lists_available() {
    let server = MockServer::start().await;
    mount_tags(&server, &["llama3:8b", "codellama:7b"]).await;

    let provider = OllamaProvider::new(&ollama_config(&server.uri())).unwrap();
    let err = provider.health_check().await.unwrap_err();

    assert!(err.to_string().contains("llama3:8b, codellama:7b"));
    match err {
        Error::ModelNotFound { model, available } => {
            assert_eq!(model, "qwen3:4b");
            assert_eq!(available, vec!["llama3:8b", "codellama:7b"]);
        }
        other => panic!("expected ModelNotFound, got: {other:?}"),
    }
}

/// Server that sends response headers for `/api/tags`, then stalls the body
fn stalled_body_server() -> String {
    use std::io::{Read, Write};

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 200\r\n\r\n{\"models\":[",
            );
            let _ = stream.flush();
            std::thread::sleep(Duration::from_secs(10));
        }
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn ollama_stalled_tags_body_is_timeout() {
    let provider = OllamaProvider::new(&ollama_config(&stalled_body_server())).unwrap();
    let err = provider.list_models().await.unwrap_err();

    assert!(matches!(err, Error::Timeout { secs: 5 }), "got: {err:?}");
}

#[tokio::test]
async fn ollama_health_check_timeout_names_the_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"models": [{"name": "qwen3:4b"}]}))
                .set_delay(Duration::from_secs(7)),
        )
        .mount(&server)
        .await;

    let provider = OllamaProvider::new(&ollama_config(&server.uri())).unwrap();
    let err = provider.health_check().await.unwrap_err();

    match err {
        Error::HealthCheckTimeout { ref endpoint, secs } => {
            assert_eq!(endpoint, &server.uri());
            assert_eq!(secs, 5);
        }
        ref other => panic!("expected HealthCheckTimeout, got: {other:?}"),
    }
    assert!(!err.to_string().contains("timeout_secs"));
}

// ─── Ollama generation ───────────────────────────────────────────────────────

#[tokio::test]
async fn ollama_generate_sends_options() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(serde_json::json!({
            "model": "qwen3:4b",
            "prompt": "summarize me",
            "stream": false,
            "options": {
                "temperature": 0.3,
                "top_p": 0.8,
                "num_ctx": 4096,
                "stop": ["\n\nDIFF:", "\n\nCOMMIT"]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "qwen3:4b",
            "response": "Adds a token check.",
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OllamaProvider::new(&ollama_config(&server.uri())).unwrap();
    let request = GenerationRequest::new("summarize me".into(), SamplingProfile::Summarize, 4096);
    let result = provider
        .generate(&request, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.text, "Adds a token check.");
}

#[tokio::test]
async fn ollama_generate_accumulates_chunks() {
    let server = MockServer::start().await;

    let body = [
        r#"{"response":"feat","done":false}"#,
        r#"{"response":"(scope","done":false}"#,
        r#"{"response":"): add","done":false}"#,
        r#"{"response":" feature","done":true}"#,
    ]
    .join("\n");

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let provider = OllamaProvider::new(&ollama_config(&server.uri())).unwrap();
    let result = provider
        .generate(&compose_request("test prompt"), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.text, "feat(scope): add feature");
}

#[tokio::test]
async fn ollama_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let provider = OllamaProvider::new(&ollama_config(&server.uri())).unwrap();
    let err = provider
        .generate(&compose_request("test prompt"), CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        Error::Server { provider, status } => {
            assert_eq!(provider, "ollama");
            assert_eq!(status, 500);
        }
        other => panic!("expected Server error, got: {other:?}"),
    }
}

#[tokio::test]
async fn ollama_malformed_body_is_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let provider = OllamaProvider::new(&ollama_config(&server.uri())).unwrap();
    let err = provider
        .generate(&compose_request("test prompt"), CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        Error::Protocol { body, .. } => assert_eq!(body, "<html>proxy error</html>"),
        other => panic!("expected Protocol error, got: {other:?}"),
    }
}

#[tokio::test]
async fn ollama_generation_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"response": "late", "done": true}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = ollama_config(&server.uri());
    config.timeout_secs = 1;

    let provider = OllamaProvider::new(&config).unwrap();
    let err = provider
        .generate(&compose_request("test prompt"), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout { secs: 1 }), "got: {err:?}");
    assert!(err.to_string().contains("1s"));
}

#[tokio::test]
async fn ollama_generation_can_be_cancelled() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"response": "late", "done": true}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let provider = OllamaProvider::new(&ollama_config(&server.uri())).unwrap();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = provider
        .generate(&compose_request("test prompt"), cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled), "got: {err:?}");
}

// ─── OpenAI generation ───────────────────────────────────────────────────────

#[tokio::test]
async fn openai_generate_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", format!("Bearer {API_KEY}").as_str()))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "messages": [{"role": "user", "content": "test prompt"}],
            "max_tokens": 4096,
            "temperature": 0.7,
            "top_p": 0.9,
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion("feat: add test")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new(&openai_config(&server.uri())).unwrap();
    let result = provider
        .generate(&compose_request("test prompt"), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.text, "feat: add test");
}

#[tokio::test]
async fn openai_unauthorized() {
    let err = openai_status(401, r#"{"error":{"message":"invalid API key"}}"#).await;
    match err {
        Error::Authentication { provider } => assert_eq!(provider, "openai"),
        other => panic!("expected Authentication, got: {other:?}"),
    }
}

#[tokio::test]
async fn openai_model_not_found() {
    let err = openai_status(404, "not found").await;
    match err {
        Error::ModelNotFound { model, .. } => assert_eq!(model, "gpt-4o-mini"),
        other => panic!("expected ModelNotFound, got: {other:?}"),
    }
}

#[tokio::test]
async fn openai_rate_limited() {
    let err = openai_status(429, "slow down").await;
    assert!(matches!(err, Error::RateLimited { .. }), "got: {err:?}");
}

#[tokio::test]
async fn openai_server_errors() {
    for status in [500, 502, 503, 504] {
        let err = openai_status(status, "upstream failure").await;
        assert!(
            matches!(err, Error::Server { status: s, .. } if s == status),
            "status {status} mapped to {err:?}"
        );
    }
}

#[tokio::test]
async fn openai_unexpected_status_keeps_body() {
    let err = openai_status(418, "teapot").await;
    match err {
        Error::Protocol { status, body, .. } => {
            assert_eq!(status, 418);
            assert_eq!(body, "teapot");
        }
        other => panic!("expected Protocol, got: {other:?}"),
    }
}

#[tokio::test]
async fn openai_malformed_json() {
    let err = openai_status(200, "{not json").await;
    assert!(matches!(err, Error::Protocol { status: 200, .. }), "got: {err:?}");
}

#[tokio::test]
async fn openai_without_choices_is_protocol_error() {
    let err = openai_status(200, r#"{"choices": []}"#).await;
    assert!(matches!(err, Error::Protocol { .. }), "got: {err:?}");
}

#[tokio::test]
async fn openai_connection_refused() {
    let provider = OpenAiProvider::new(&openai_config("http://127.0.0.1:1")).unwrap();
    let err = provider.health_check().await.unwrap_err();

    match err {
        Error::Connectivity { endpoint, hint } => {
            assert_eq!(endpoint, "http://127.0.0.1:1");
            assert!(hint.contains("base_url"), "hint was: {hint}");
        }
        other => panic!("expected Connectivity, got: {other:?}"),
    }
}

#[tokio::test]
async fn openai_health_check_is_minimal_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({"max_tokens": 1, "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new(&openai_config(&server.uri())).unwrap();
    provider.health_check().await.unwrap();
}

// ─── End to end ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn pipeline_over_openai_normalizes_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion(
            "<think>small change</think>\nfix(parser): handle empty input",
        )))
        .expect(2)
        .mount(&server)
        .await;

    let config = openai_config(&server.uri());
    let provider = OpenAiProvider::new(&config).unwrap();
    let pipeline = CommitPipeline::new(Box::new(provider), &config, CancellationToken::new());

    let message = pipeline
        .generate_commit_message("diff --git a/p.rs b/p.rs\n+if s.is_empty() {}", "")
        .await
        .unwrap();

    assert_eq!(message, "fix(parser): handle empty input");
}

#[tokio::test]
async fn pipeline_over_ollama_rejects_blank_reply() {
    let server = MockServer::start().await;
    mount_tags(&server, &["qwen3:4b"]).await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": "   ",
            "done": true
        })))
        .mount(&server)
        .await;

    let config = ollama_config(&server.uri());
    let provider = OllamaProvider::new(&config).unwrap();
    let pipeline = CommitPipeline::new(Box::new(provider), &config, CancellationToken::new());

    let err = pipeline
        .generate_commit_message("diff --git a/x b/x", "")
        .await
        .unwrap_err();

    match err {
        Error::EmptyResponse { raw } => assert_eq!(raw, "   "),
        other => panic!("expected EmptyResponse, got: {other:?}"),
    }
}
