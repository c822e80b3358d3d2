//! Mistral AI provider adapter
//!
//! OpenAI-compatible chat dialect, minus the penalty parameters.

use crate::core::error::ProviderError;
use crate::core::providers::shared::{
    WireOptions, chat_body, parse_chat_completion, parse_model_list, read_response,
};
use crate::core::providers::{InferenceOutput, LLMProvider};
use crate::core::types::{CatalogEntry, InferenceRequest, Provider};
use async_trait::async_trait;
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1";

#[derive(Debug, Clone)]
pub struct MistralConfig {
    pub api_key: String,
    pub base_url: String,
}

impl MistralConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MistralProvider {
    http: reqwest::Client,
    config: MistralConfig,
}

impl MistralProvider {
    pub fn new(http: reqwest::Client, config: MistralConfig) -> Self {
        Self { http, config }
    }

    fn wire_options() -> WireOptions {
        WireOptions {
            penalties: false,
            ..WireOptions::default()
        }
    }
}

#[async_trait]
impl LLMProvider for MistralProvider {
    fn name(&self) -> &'static str {
        "mistral"
    }

    fn provider(&self) -> Provider {
        Provider::Mistral
    }

    async fn list_models(&self) -> Result<Vec<CatalogEntry>, ProviderError> {
        let response = self
            .http
            .get(format!("{}/models", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .send()
            .await;
        let body = read_response(Provider::Mistral, response).await?;
        let entries: Vec<CatalogEntry> = parse_model_list(Provider::Mistral, &body)?
            .into_iter()
            .map(|id| CatalogEntry::probe(Provider::Mistral, &id, None))
            .collect();
        info!(count = entries.len(), "loaded Mistral model catalog");
        Ok(entries)
    }

    async fn infer(
        &self,
        model_name: &str,
        request: &InferenceRequest,
    ) -> Result<InferenceOutput, ProviderError> {
        let body = chat_body(model_name, request, Self::wire_options());
        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await;
        let body = read_response(Provider::Mistral, response).await?;
        parse_chat_completion(Provider::Mistral, &body)
    }
}
