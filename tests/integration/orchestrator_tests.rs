//! Orchestrator pipeline tests against mocked vendors
//!
//! These drive the full resolve → cache → retry → adapter chain through
//! wiremock doubles and verify the testable properties of the design:
//! cache idempotence and expiry, the retry bound, fast-fail on permanent
//! errors, comparison isolation, and catalog staleness behavior.

use crate::common::{arena_for, chat_completion_json, test_config};
use prompt_arena::{
    ErrorKind, InferenceRequest, ModelId, OrchestratorConfig, Provider, SystemPromptSource,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn openai_model() -> ModelId {
    "openai/gpt-4o".parse().unwrap()
}

#[tokio::test]
async fn test_deterministic_requests_hit_the_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_json("4")))
        .expect(1)
        .mount(&server)
        .await;

    let arena = arena_for(&[(Provider::OpenAI, server.uri())], test_config());
    let request = InferenceRequest::new("What is 2+2?").with_temperature(0.0);

    let first = arena.infer(&openai_model(), &request).await;
    let second = arena.infer(&openai_model(), &request).await;

    assert!(first.is_success());
    assert_eq!(first.text, "4");
    // Byte-identical answer, no second adapter call (enforced by expect).
    assert_eq!(first.text, second.text);
    assert_eq!(first.usage, second.usage);
}

#[tokio::test]
async fn test_expired_cache_entries_are_misses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_json("4")))
        .expect(2)
        .mount(&server)
        .await;

    let config = OrchestratorConfig {
        response_cache_ttl: Duration::ZERO,
        ..test_config()
    };
    let arena = arena_for(&[(Provider::OpenAI, server.uri())], config);
    let request = InferenceRequest::new("What is 2+2?").with_temperature(0.0);

    arena.infer(&openai_model(), &request).await;
    arena.infer(&openai_model(), &request).await;
}

#[tokio::test]
async fn test_sampled_requests_bypass_the_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_json("a poem")))
        .expect(2)
        .mount(&server)
        .await;

    let arena = arena_for(&[(Provider::OpenAI, server.uri())], test_config());
    let request = InferenceRequest::new("Write a poem").with_temperature(0.9);

    arena.infer(&openai_model(), &request).await;
    arena.infer(&openai_model(), &request).await;
}

#[tokio::test]
async fn test_transient_failures_retry_up_to_the_bound() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": {"message": "The server is temporarily unavailable"}
        })))
        .expect(3)
        .mount(&server)
        .await;

    let arena = arena_for(&[(Provider::OpenAI, server.uri())], test_config());
    let result = arena
        .infer(&openai_model(), &InferenceRequest::new("hello"))
        .await;

    let error = result.error.expect("result should carry the failure");
    assert_eq!(error.kind, ErrorKind::TransientNetwork);
    assert!(result.text.is_empty());
}

#[tokio::test]
async fn test_auth_failures_fail_fast() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let arena = arena_for(&[(Provider::OpenAI, server.uri())], test_config());
    let result = arena
        .infer(&openai_model(), &InferenceRequest::new("hello"))
        .await;

    let error = result.error.unwrap();
    assert_eq!(error.kind, ErrorKind::Authentication);
    // The user message never leaks the vendor payload.
    assert!(!error.message.contains("Incorrect API key provided"));
    assert!(error.message.contains("Check the configured API key"));
}

#[tokio::test]
async fn test_comparison_isolates_failures() {
    let failing = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "bad key"}
        })))
        .mount(&failing)
        .await;

    let healthy = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_json("all good")))
        .mount(&healthy)
        .await;

    let arena = arena_for(
        &[
            (Provider::OpenAI, failing.uri()),
            (Provider::Mistral, healthy.uri()),
        ],
        test_config(),
    );
    let request = InferenceRequest::new("hello");
    let mistral: ModelId = "mistral/mistral-small-latest".parse().unwrap();

    let (left, right) = arena
        .compare((&openai_model(), &request), (&mistral, &request))
        .await;

    assert_eq!(left.error.unwrap().kind, ErrorKind::Authentication);
    assert!(right.is_success());
    assert_eq!(right.text, "all good");
    assert_eq!(right.usage.total, Some(12));
}

#[tokio::test]
async fn test_missing_credential_is_reported_not_thrown() {
    let arena = arena_for(&[(Provider::OpenAI, "http://127.0.0.1:1".to_string())], test_config());
    let groq: ModelId = "groq/llama-3.1-8b-instant".parse().unwrap();

    let result = arena.infer(&groq, &InferenceRequest::new("hello")).await;
    let error = result.error.unwrap();
    assert_eq!(error.kind, ErrorKind::MissingCredential);
    assert!(error.message.contains("Groq"));
}

#[tokio::test]
async fn test_catalog_serves_stale_data_after_refresh_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "gpt-4o"}, {"id": "gpt-3.5-turbo"}]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"message": "internal error"}
        })))
        .mount(&server)
        .await;

    let config = OrchestratorConfig {
        models_cache_ttl: Duration::ZERO,
        ..test_config()
    };
    let arena = arena_for(&[(Provider::OpenAI, server.uri())], config);

    let first = arena.list_catalog(Some(Provider::OpenAI)).await.unwrap();
    assert_eq!(first.len(), 2);

    // The TTL is zero, so this forces a refresh, which now fails; the
    // previous population is served instead of an error.
    let second = arena.list_catalog(Some(Provider::OpenAI)).await.unwrap();
    assert_eq!(second, first);
}

#[tokio::test]
async fn test_catalog_across_providers_skips_missing_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "gpt-4o"}, {"id": "whisper-1"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Only OpenAI has a credential; the other five providers must be
    // skipped without any listing attempt.
    let arena = arena_for(&[(Provider::OpenAI, server.uri())], test_config());
    let catalog = arena.list_catalog(None).await.unwrap();

    // whisper-1 is filtered out by the adapter; gpt-4o survives.
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].id.to_string(), "openai/gpt-4o");
}

#[tokio::test]
async fn test_catalog_invalidation_forces_refetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "gpt-4o"}]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let arena = arena_for(&[(Provider::OpenAI, server.uri())], test_config());
    arena.list_catalog(Some(Provider::OpenAI)).await.unwrap();
    arena.invalidate_catalog(Some(Provider::OpenAI)).await;
    arena.list_catalog(Some(Provider::OpenAI)).await.unwrap();
}

struct TersePrompts;

#[async_trait::async_trait]
impl SystemPromptSource for TersePrompts {
    async fn default_system_prompt(&self, _model: &ModelId) -> Option<String> {
        Some("You are terse.".to_string())
    }
}

#[tokio::test]
async fn test_default_system_prompt_applies_only_when_absent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_json("ok")))
        .mount(&server)
        .await;

    let credentials =
        prompt_arena::StaticCredentials::new([(Provider::OpenAI, "test-key".to_string())]);
    let arena = prompt_arena::Orchestrator::builder()
        .with_config(test_config())
        .with_credentials(credentials)
        .with_system_prompts(TersePrompts)
        .with_registry(crate::common::registry_for(&[(
            Provider::OpenAI,
            server.uri(),
        )]))
        .build()
        .unwrap();

    arena
        .infer(&openai_model(), &InferenceRequest::new("hello"))
        .await;
    arena
        .infer(
            &openai_model(),
            &InferenceRequest::new("hello").with_system_prompt("You are verbose."),
        )
        .await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    let first: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(first["messages"][0]["role"], "system");
    assert_eq!(first["messages"][0]["content"], "You are terse.");

    let second: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(second["messages"][0]["content"], "You are verbose.");
}

#[tokio::test]
async fn test_defaults_are_applied_to_the_wire_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_json("ok")))
        .mount(&server)
        .await;

    let arena = arena_for(&[(Provider::OpenAI, server.uri())], test_config());
    arena
        .infer(&openai_model(), &InferenceRequest::new("hello"))
        .await;

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    // Unset request fields are filled from config defaults before the
    // adapter builds the vendor payload.
    assert_eq!(body["max_tokens"], 1024);
    assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
}
