//! Adapter wire-format and classification tests
//!
//! Each adapter is exercised directly (no retry layer in between) against
//! a wiremock double, checking the exact request shape it produces and
//! how it classifies vendor failures.

use prompt_arena::core::providers::anthropic::{AnthropicConfig, AnthropicProvider};
use prompt_arena::core::providers::gemini::{GeminiConfig, GeminiProvider};
use prompt_arena::core::providers::groq::{GroqConfig, GroqProvider};
use prompt_arena::core::providers::huggingface::{HuggingFaceConfig, HuggingFaceProvider};
use prompt_arena::core::providers::mistral::{MistralConfig, MistralProvider};
use prompt_arena::core::providers::openai::{OpenAIConfig, OpenAIProvider};
use prompt_arena::{ErrorKind, InferenceRequest, LLMProvider};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http() -> reqwest::Client {
    reqwest::Client::new()
}

fn full_request() -> InferenceRequest {
    InferenceRequest::new("Say hi")
        .with_system_prompt("Be friendly")
        .with_temperature(0.5)
        .with_max_tokens(128)
        .with_top_p(0.9)
        .with_frequency_penalty(0.25)
        .with_presence_penalty(-0.25)
        .with_stop_sequences(["END".to_string()])
}

#[tokio::test]
async fn test_openai_wire_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "hi"}}],
            "usage": {"prompt_tokens": 11, "completion_tokens": 2, "total_tokens": 13}
        })))
        .mount(&server)
        .await;

    let adapter = OpenAIProvider::new(
        http(),
        OpenAIConfig {
            api_key: "sk-test".to_string(),
            base_url: server.uri(),
        },
    );
    let output = adapter.infer("gpt-4o", &full_request()).await.unwrap();
    assert_eq!(output.text, "hi");
    assert_eq!(output.usage.prompt, Some(11));
    assert_eq!(output.usage.total, Some(13));

    let body: serde_json::Value =
        serde_json::from_slice(&server.received_requests().await.unwrap()[0].body).unwrap();
    assert_eq!(body["model"], "gpt-4o");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["max_tokens"], 128);
    assert_eq!(body["stop"], json!(["END"]));
    assert!(body["frequency_penalty"].is_number());
}

#[tokio::test]
async fn test_openai_listing_keeps_completion_models() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": "gpt-4o"},
                {"id": "whisper-1"},
                {"id": "text-embedding-3-small"},
                {"id": "text-davinci-003"}
            ]
        })))
        .mount(&server)
        .await;

    let adapter = OpenAIProvider::new(
        http(),
        OpenAIConfig {
            api_key: "sk-test".to_string(),
            base_url: server.uri(),
        },
    );
    let entries = adapter.list_models().await.unwrap();
    let ids: Vec<String> = entries.iter().map(|e| e.id.name.clone()).collect();
    assert_eq!(ids, vec!["gpt-4o", "text-davinci-003"]);
}

#[tokio::test]
async fn test_anthropic_wire_shape_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                {"type": "text", "text": "Hello"},
                {"type": "text", "text": " there"}
            ],
            "usage": {"input_tokens": 10, "output_tokens": 4}
        })))
        .mount(&server)
        .await;

    let adapter = AnthropicProvider::new(
        http(),
        AnthropicConfig {
            api_key: "sk-ant-test".to_string(),
            base_url: server.uri(),
        },
    );
    let output = adapter
        .infer("claude-3-haiku-20240307", &InferenceRequest::new("Say hi").with_system_prompt("Be brief"))
        .await
        .unwrap();

    // Text blocks are concatenated; the total is derived from the parts.
    assert_eq!(output.text, "Hello there");
    assert_eq!(output.usage.total, Some(14));

    let body: serde_json::Value =
        serde_json::from_slice(&server.received_requests().await.unwrap()[0].body).unwrap();
    // max_tokens is mandatory on this API, so the adapter defaults it.
    assert_eq!(body["max_tokens"], 1024);
    assert_eq!(body["system"], "Be brief");
    assert_eq!(body["messages"][0]["role"], "user");
}

#[tokio::test]
async fn test_anthropic_listing_probes_the_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "pong"}],
            "usage": {"input_tokens": 1, "output_tokens": 1}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = AnthropicProvider::new(
        http(),
        AnthropicConfig {
            api_key: "sk-ant-test".to_string(),
            base_url: server.uri(),
        },
    );
    let entries = adapter.list_models().await.unwrap();
    assert!(!entries.is_empty());
    assert!(entries.iter().all(|e| e.id.provider.token() == "anthropic"));
}

#[tokio::test]
async fn test_anthropic_listing_fails_on_bad_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"type": "authentication_error", "message": "invalid x-api-key"}
        })))
        .mount(&server)
        .await;

    let adapter = AnthropicProvider::new(
        http(),
        AnthropicConfig {
            api_key: "bad".to_string(),
            base_url: server.uri(),
        },
    );
    let err = adapter.list_models().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[tokio::test]
async fn test_gemini_wire_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-pro:generateContent"))
        .and(query_param("key", "g-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "bonjour"}]}}],
            "usageMetadata": {"totalTokenCount": 9}
        })))
        .mount(&server)
        .await;

    let adapter = GeminiProvider::new(
        http(),
        GeminiConfig {
            api_key: "g-test".to_string(),
            base_url: server.uri(),
        },
    );
    let output = adapter.infer("gemini-pro", &full_request()).await.unwrap();
    assert_eq!(output.text, "bonjour");
    assert_eq!(output.usage.total, Some(9));
    assert_eq!(output.usage.prompt, None);

    let body: serde_json::Value =
        serde_json::from_slice(&server.received_requests().await.unwrap()[0].body).unwrap();
    assert_eq!(body["contents"][0]["parts"][0]["text"], "Say hi");
    assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be friendly");
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 128);
    assert_eq!(body["generationConfig"]["stopSequences"], json!(["END"]));
}

#[tokio::test]
async fn test_gemini_blocked_prompt_is_content_policy() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [],
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .mount(&server)
        .await;

    let adapter = GeminiProvider::new(
        http(),
        GeminiConfig {
            api_key: "g-test".to_string(),
            base_url: server.uri(),
        },
    );
    let err = adapter
        .infer("gemini-pro", &InferenceRequest::new("something"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ContentPolicy);
}

#[tokio::test]
async fn test_gemini_listing_filters_generation_models() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                {
                    "name": "models/gemini-pro",
                    "displayName": "Gemini Pro",
                    "supportedGenerationMethods": ["generateContent", "countTokens"]
                },
                {
                    "name": "models/embedding-001",
                    "displayName": "Embedding 001",
                    "supportedGenerationMethods": ["embedContent"]
                }
            ]
        })))
        .mount(&server)
        .await;

    let adapter = GeminiProvider::new(
        http(),
        GeminiConfig {
            api_key: "g-test".to_string(),
            base_url: server.uri(),
        },
    );
    let entries = adapter.list_models().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id.name, "gemini-pro");
    assert_eq!(entries[0].display_name, "Gemini Pro");
}

#[tokio::test]
async fn test_groq_drops_system_prompt_for_llama_models() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "hi"}}]
        })))
        .mount(&server)
        .await;

    let adapter = GroqProvider::new(
        http(),
        GroqConfig {
            api_key: "gsk-test".to_string(),
            base_url: server.uri(),
        },
    );
    adapter
        .infer("llama-3.1-8b-instant", &full_request())
        .await
        .unwrap();

    let body: serde_json::Value =
        serde_json::from_slice(&server.received_requests().await.unwrap()[0].body).unwrap();
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "user");
}

#[tokio::test]
async fn test_mistral_omits_penalty_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "salut"}}],
            "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
        })))
        .mount(&server)
        .await;

    let adapter = MistralProvider::new(
        http(),
        MistralConfig {
            api_key: "m-test".to_string(),
            base_url: server.uri(),
        },
    );
    let output = adapter
        .infer("mistral-small-latest", &full_request())
        .await
        .unwrap();
    assert_eq!(output.text, "salut");

    let body: serde_json::Value =
        serde_json::from_slice(&server.received_requests().await.unwrap()[0].body).unwrap();
    assert!(body.get("frequency_penalty").is_none());
    assert!(body.get("presence_penalty").is_none());
    assert_eq!(body["top_p"], 0.9);
}

#[tokio::test]
async fn test_hub_strips_echoed_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gpt2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"generated_text": "Say hi  Hello!"}
        ])))
        .mount(&server)
        .await;

    let mut config = HuggingFaceConfig::new("hf-test");
    config.base_url = server.uri();
    let adapter = HuggingFaceProvider::new(http(), config);

    let output = adapter
        .infer("gpt2", &InferenceRequest::new("Say hi"))
        .await
        .unwrap();
    assert_eq!(output.text, "Hello!");
    // The hub never reports token counts; nothing is fabricated.
    assert_eq!(output.usage.total, None);
}

#[tokio::test]
async fn test_hub_loading_model_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": "Model bigscience/bloom is currently loading",
            "estimated_time": 131.4
        })))
        .mount(&server)
        .await;

    let mut config = HuggingFaceConfig::new("hf-test");
    config.base_url = server.uri();
    let adapter = HuggingFaceProvider::new(http(), config);

    let err = adapter
        .infer("bigscience/bloom", &InferenceRequest::new("hi"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransientNetwork);
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_hub_zero_temperature_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"generated_text": "ok"}
        ])))
        .mount(&server)
        .await;

    let mut config = HuggingFaceConfig::new("hf-test");
    config.base_url = server.uri();
    let adapter = HuggingFaceProvider::new(http(), config);

    adapter
        .infer("gpt2", &InferenceRequest::new("hi").with_temperature(0.0))
        .await
        .unwrap();

    let body: serde_json::Value =
        serde_json::from_slice(&server.received_requests().await.unwrap()[0].body).unwrap();
    assert!(body["parameters"].get("temperature").is_none());
}

#[tokio::test]
async fn test_rate_limit_classification_carries_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "Rate limit reached", "retry_after": 21}
        })))
        .mount(&server)
        .await;

    let adapter = OpenAIProvider::new(
        http(),
        OpenAIConfig {
            api_key: "sk-test".to_string(),
            base_url: server.uri(),
        },
    );
    let err = adapter
        .infer("gpt-4o", &InferenceRequest::new("hi"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RateLimited);
    match err {
        prompt_arena::ProviderError::RateLimited { retry_after, .. } => {
            assert_eq!(retry_after, Some(21));
        }
        other => panic!("expected rate limit, got {other:?}"),
    }
}
