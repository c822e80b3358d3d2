//! Hugging Face hub provider adapter
//!
//! Serverless inference over hub-hosted models. Cold models answer with a
//! "currently loading" error that is transient by definition, and the API
//! never reports token counts.

use crate::core::error::{ProviderError, classify_message, classify_status};
use crate::core::providers::{InferenceOutput, LLMProvider};
use crate::core::types::{CatalogEntry, InferenceRequest, Provider, TokenUsage};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_HUB_URL: &str = "https://huggingface.co";

/// How many of the most-downloaded text-generation models to advertise.
const CATALOG_LIMIT: u32 = 50;

#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    pub api_key: String,
    pub base_url: String,
    pub hub_url: String,
}

impl HuggingFaceConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            hub_url: DEFAULT_HUB_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HuggingFaceProvider {
    http: reqwest::Client,
    config: HuggingFaceConfig,
}

#[derive(Debug, Deserialize)]
struct Generation {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
struct HubModel {
    #[serde(alias = "modelId")]
    id: String,
}

impl HuggingFaceProvider {
    pub fn new(http: reqwest::Client, config: HuggingFaceConfig) -> Self {
        Self { http, config }
    }
}

fn classify(status: u16, body: &str) -> ProviderError {
    let provider = Provider::HuggingFace;
    // Loading/overload conditions arrive as `{"error": ..., "estimated_time": ...}`.
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
            if let Some(classified) = classify_message(provider, message) {
                return classified;
            }
        }
    }
    classify_status(provider, status, body)
}

#[async_trait]
impl LLMProvider for HuggingFaceProvider {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    fn provider(&self) -> Provider {
        Provider::HuggingFace
    }

    async fn list_models(&self) -> Result<Vec<CatalogEntry>, ProviderError> {
        let url = format!(
            "{}/api/models?filter=text-generation&sort=downloads&direction=-1&limit={}",
            self.config.hub_url, CATALOG_LIMIT
        );
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(Provider::HuggingFace, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(Provider::HuggingFace, e))?;
        if !status.is_success() {
            return Err(classify(status.as_u16(), &body));
        }

        let models: Vec<HubModel> = serde_json::from_str(&body).map_err(|e| {
            ProviderError::unknown(Provider::HuggingFace, format!("malformed hub listing: {e}"))
        })?;

        let mut seen = HashSet::new();
        let entries: Vec<CatalogEntry> = models
            .into_iter()
            .filter(|model| seen.insert(model.id.clone()))
            .map(|model| CatalogEntry::probe(Provider::HuggingFace, &model.id, None))
            .collect();
        info!(count = entries.len(), "loaded hub model catalog");
        Ok(entries)
    }

    async fn infer(
        &self,
        model_name: &str,
        request: &InferenceRequest,
    ) -> Result<InferenceOutput, ProviderError> {
        let mut parameters = json!({});
        if let Some(max_tokens) = request.max_tokens {
            parameters["max_new_tokens"] = json!(max_tokens);
        }
        // The inference API rejects zero temperature.
        if let Some(temperature) = request.temperature {
            if temperature > 0.0 {
                parameters["temperature"] = json!(temperature);
            }
        }
        if let Some(top_p) = request.top_p {
            parameters["top_p"] = json!(top_p);
        }
        if let Some(stop) = &request.stop_sequences {
            if !stop.is_empty() {
                parameters["stop"] = json!(stop);
            }
        }
        let body = json!({
            "inputs": request.prompt,
            "parameters": parameters,
        });

        let response = self
            .http
            .post(format!("{}/models/{}", self.config.base_url, model_name))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(Provider::HuggingFace, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(Provider::HuggingFace, e))?;
        if !status.is_success() {
            return Err(classify(status.as_u16(), &body));
        }

        let generations: Vec<Generation> = serde_json::from_str(&body).map_err(|e| {
            ProviderError::unknown(Provider::HuggingFace, format!("malformed generation body: {e}"))
        })?;
        let raw = generations
            .into_iter()
            .next()
            .map(|generation| generation.generated_text)
            .unwrap_or_default();

        // Older text-generation backends echo the prompt ahead of the
        // completion.
        let text = match raw.strip_prefix(request.prompt.as_str()) {
            Some(stripped) => stripped.trim_start().to_string(),
            None => raw,
        };

        Ok(InferenceOutput {
            text,
            usage: TokenUsage::default(),
        })
    }
}
