//! Shared test infrastructure

use prompt_arena::{
    Orchestrator, OrchestratorConfig, Provider, ProviderRegistry, RetryConfig, StaticCredentials,
};
use serde_json::{Value, json};
use std::time::Duration;

/// OpenAI-style chat completion body with usage counts.
pub fn chat_completion_json(text: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 7, "completion_tokens": 5, "total_tokens": 12}
    })
}

/// Retry settings with real-time delays short enough for tests.
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 2,
        base_delay: Duration::from_millis(10),
        backoff_factor: 2.0,
    }
}

/// Orchestrator config tuned for tests: fast retries, defaults otherwise.
pub fn test_config() -> OrchestratorConfig {
    OrchestratorConfig {
        retry: fast_retry(),
        ..OrchestratorConfig::default()
    }
}

/// Registry whose listed providers point at test doubles.
pub fn registry_for(overrides: &[(Provider, String)]) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new(reqwest::Client::new());
    for (provider, url) in overrides {
        registry = registry.with_base_url(*provider, url.clone());
    }
    registry
}

/// Orchestrator with credentials and base-URL overrides for the given
/// providers, all pointing at test doubles.
pub fn arena_for(overrides: &[(Provider, String)], config: OrchestratorConfig) -> Orchestrator {
    let credentials = StaticCredentials::new(
        overrides
            .iter()
            .map(|(provider, _)| (*provider, format!("test-key-{provider}"))),
    );
    Orchestrator::builder()
        .with_config(config)
        .with_credentials(credentials)
        .with_registry(registry_for(overrides))
        .build()
        .expect("test orchestrator should build")
}
