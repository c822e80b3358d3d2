//! Groq provider adapter
//!
//! Groq exposes the OpenAI chat-completions dialect; the differences are
//! the base URL and that some hosted models reject system messages.

use crate::core::error::ProviderError;
use crate::core::providers::shared::{
    WireOptions, chat_body, parse_chat_completion, parse_model_list, read_response,
};
use crate::core::providers::{InferenceOutput, LLMProvider};
use crate::core::types::{CatalogEntry, InferenceRequest, ModelCapabilities, Provider};
use async_trait::async_trait;
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub api_key: String,
    pub base_url: String,
}

impl GroqConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GroqProvider {
    http: reqwest::Client,
    config: GroqConfig,
}

impl GroqProvider {
    pub fn new(http: reqwest::Client, config: GroqConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl LLMProvider for GroqProvider {
    fn name(&self) -> &'static str {
        "groq"
    }

    fn provider(&self) -> Provider {
        Provider::Groq
    }

    async fn list_models(&self) -> Result<Vec<CatalogEntry>, ProviderError> {
        let response = self
            .http
            .get(format!("{}/models", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .send()
            .await;
        let body = read_response(Provider::Groq, response).await?;
        let entries: Vec<CatalogEntry> = parse_model_list(Provider::Groq, &body)?
            .into_iter()
            .map(|id| CatalogEntry::probe(Provider::Groq, &id, None))
            .collect();
        info!(count = entries.len(), "loaded Groq model catalog");
        Ok(entries)
    }

    async fn infer(
        &self,
        model_name: &str,
        request: &InferenceRequest,
    ) -> Result<InferenceOutput, ProviderError> {
        let capabilities = ModelCapabilities::probe(Provider::Groq, model_name);
        let body = chat_body(
            model_name,
            request,
            WireOptions {
                system_message: capabilities.supports_system_prompt,
                ..WireOptions::default()
            },
        );
        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await;
        let body = read_response(Provider::Groq, response).await?;
        parse_chat_completion(Provider::Groq, &body)
    }
}
