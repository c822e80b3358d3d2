//! OpenAI provider adapter

use crate::core::error::ProviderError;
use crate::core::providers::shared::{
    WireOptions, chat_body, parse_chat_completion, parse_model_list, read_response,
};
use crate::core::providers::{InferenceOutput, LLMProvider};
use crate::core::types::{CatalogEntry, InferenceRequest, Provider};
use async_trait::async_trait;
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAIProvider {
    http: reqwest::Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    pub fn new(http: reqwest::Client, config: OpenAIConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    async fn list_models(&self) -> Result<Vec<CatalogEntry>, ProviderError> {
        let response = self
            .http
            .get(format!("{}/models", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .send()
            .await;
        let body = read_response(Provider::OpenAI, response).await?;

        // The listing mixes in embedding, audio, and legacy models; keep
        // the completion families the arena can actually drive.
        let entries: Vec<CatalogEntry> = parse_model_list(Provider::OpenAI, &body)?
            .into_iter()
            .filter(|id| id.starts_with("gpt-") || id.starts_with("text-davinci"))
            .map(|id| CatalogEntry::probe(Provider::OpenAI, &id, None))
            .collect();
        info!(count = entries.len(), "loaded OpenAI model catalog");
        Ok(entries)
    }

    async fn infer(
        &self,
        model_name: &str,
        request: &InferenceRequest,
    ) -> Result<InferenceOutput, ProviderError> {
        let body = chat_body(model_name, request, WireOptions::default());
        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await;
        let body = read_response(Provider::OpenAI, response).await?;
        parse_chat_completion(Provider::OpenAI, &body)
    }
}
