//! Anthropic provider adapter
//!
//! The messages API has no model-listing endpoint, so the catalog comes
//! from a maintained static table, validated with one cheap probe call.

use crate::core::error::{ErrorKind, ProviderError, classify_message, classify_status};
use crate::core::providers::{InferenceOutput, LLMProvider};
use crate::core::types::{CatalogEntry, InferenceRequest, Provider, TokenUsage};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// The messages API rejects requests without `max_tokens`.
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Models the arena offers when no listing endpoint exists. Ordered from
/// most to least capable; the last entry doubles as the cheap probe model.
const KNOWN_MODELS: [&str; 8] = [
    "claude-3-opus-20240229",
    "claude-3-sonnet-20240229",
    "claude-3-haiku-20240307",
    "claude-3-5-sonnet-20240620",
    "claude-3-5-haiku-20241022",
    "claude-2.1",
    "claude-2.0",
    "claude-instant-1.2",
];

static STATIC_CATALOG: Lazy<Vec<CatalogEntry>> = Lazy::new(|| {
    KNOWN_MODELS
        .iter()
        .map(|name| {
            let display = name.replace('-', " ");
            CatalogEntry::probe(Provider::Anthropic, name, Some(&display))
        })
        .collect()
});

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub base_url: String,
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    http: reqwest::Client,
    config: AnthropicConfig,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Option<MessagesUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesUsage {
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
}

impl AnthropicProvider {
    pub fn new(http: reqwest::Client, config: AnthropicConfig) -> Self {
        Self { http, config }
    }

    async fn messages(&self, body: serde_json::Value) -> Result<String, ProviderError> {
        let response = self
            .http
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(Provider::Anthropic, e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(Provider::Anthropic, e))?;
        if !status.is_success() {
            return Err(classify(status.as_u16(), &text));
        }
        Ok(text)
    }

    /// One 1-token request against the cheapest model to confirm the
    /// credential is live before advertising the static catalog.
    async fn probe_credential(&self) -> Result<(), ProviderError> {
        let body = json!({
            "model": KNOWN_MODELS[KNOWN_MODELS.len() - 1],
            "max_tokens": 1,
            "messages": [{"role": "user", "content": "Ping"}],
        });
        match self.messages(body).await {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == ErrorKind::Authentication => Err(err),
            Err(err) if err.kind() == ErrorKind::RateLimited => {
                // The key is almost certainly valid; the probe just hit a
                // throughput ceiling.
                warn!(error = %err, "credential probe was rate limited");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "credential probe failed");
                Ok(())
            }
        }
    }
}

/// Prefer the structured `error.type` field; the shared status-based
/// classification is only the fallback.
fn classify(status: u16, body: &str) -> ProviderError {
    let provider = Provider::Anthropic;
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(error) = value.get("error") {
            let error_type = error.get("type").and_then(|t| t.as_str()).unwrap_or("");
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error")
                .to_string();
            return match error_type {
                "authentication_error" | "permission_error" => {
                    ProviderError::authentication(provider, message)
                }
                "not_found_error" => ProviderError::model_not_found(provider, message),
                "rate_limit_error" => {
                    let retry_after = error.get("retry_after").and_then(|r| r.as_u64());
                    ProviderError::rate_limited(provider, message, retry_after)
                }
                "overloaded_error" => ProviderError::transient_network(provider, message),
                "invalid_request_error" => classify_message(provider, &message)
                    .unwrap_or_else(|| ProviderError::unknown(provider, message)),
                _ => classify_status(provider, status, body),
            };
        }
    }
    classify_status(provider, status, body)
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    async fn list_models(&self) -> Result<Vec<CatalogEntry>, ProviderError> {
        self.probe_credential().await?;
        let entries = STATIC_CATALOG.clone();
        info!(count = entries.len(), "loaded static Anthropic model catalog");
        Ok(entries)
    }

    async fn infer(
        &self,
        model_name: &str,
        request: &InferenceRequest,
    ) -> Result<InferenceOutput, ProviderError> {
        let mut body = json!({
            "model": model_name,
            "max_tokens": request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "messages": [{"role": "user", "content": request.prompt}],
        });
        if let Some(system) = &request.system_prompt {
            body["system"] = json!(system);
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(top_p) = request.top_p {
            body["top_p"] = json!(top_p);
        }
        if let Some(stop) = &request.stop_sequences {
            if !stop.is_empty() {
                body["stop_sequences"] = json!(stop);
            }
        }

        let body = self.messages(body).await?;
        let response: MessagesResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::unknown(Provider::Anthropic, format!("malformed messages body: {e}"))
        })?;

        let text: String = response
            .content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect();
        let usage = response
            .usage
            .map(|u| TokenUsage::from_parts(u.input_tokens, u.output_tokens))
            .unwrap_or_default();
        Ok(InferenceOutput { text, usage })
    }
}
