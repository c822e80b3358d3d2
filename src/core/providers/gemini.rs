//! Google Gemini provider adapter

use crate::core::error::{ProviderError, classify_status};
use crate::core::providers::{InferenceOutput, LLMProvider};
use crate::core::types::{CatalogEntry, InferenceRequest, Provider, TokenUsage};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_VERSION: &str = "v1beta";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiProvider {
    http: reqwest::Client,
    config: GeminiConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
    total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelsListResponse {
    #[serde(default)]
    models: Vec<ListedModel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListedModel {
    name: String,
    display_name: Option<String>,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

impl GeminiProvider {
    pub fn new(http: reqwest::Client, config: GeminiConfig) -> Self {
        Self { http, config }
    }

    async fn read(
        &self,
        response: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<String, ProviderError> {
        let response = response.map_err(|e| ProviderError::from_reqwest(Provider::Google, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(Provider::Google, e))?;
        if !status.is_success() {
            return Err(classify(status.as_u16(), &body));
        }
        Ok(body)
    }
}

/// Prefer the structured `error.status` canonical code over the raw HTTP
/// status.
fn classify(status: u16, body: &str) -> ProviderError {
    let provider = Provider::Google;
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(error) = value.get("error") {
            let canonical = error.get("status").and_then(|s| s.as_str()).unwrap_or("");
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error")
                .to_string();
            return match canonical {
                "UNAUTHENTICATED" | "PERMISSION_DENIED" => {
                    ProviderError::authentication(provider, message)
                }
                "NOT_FOUND" => ProviderError::model_not_found(provider, message),
                "RESOURCE_EXHAUSTED" => ProviderError::rate_limited(provider, message, None),
                "UNAVAILABLE" => ProviderError::transient_network(provider, message),
                _ => classify_status(provider, status, body),
            };
        }
    }
    classify_status(provider, status, body)
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn provider(&self) -> Provider {
        Provider::Google
    }

    async fn list_models(&self) -> Result<Vec<CatalogEntry>, ProviderError> {
        let url = format!(
            "{}/{}/models?key={}&pageSize=200",
            self.config.base_url, API_VERSION, self.config.api_key
        );
        let body = self.read(self.http.get(url).send().await).await?;
        let listing: ModelsListResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::unknown(Provider::Google, format!("malformed model list: {e}"))
        })?;

        let entries: Vec<CatalogEntry> = listing
            .models
            .into_iter()
            .filter(|model| {
                model
                    .supported_generation_methods
                    .iter()
                    .any(|method| method == "generateContent")
            })
            .filter_map(|model| {
                let name = model.name.strip_prefix("models/")?.to_string();
                if name.to_lowercase().contains("embedding") {
                    return None;
                }
                Some(CatalogEntry::probe(
                    Provider::Google,
                    &name,
                    model.display_name.as_deref(),
                ))
            })
            .collect();
        info!(count = entries.len(), "loaded Google AI model catalog");
        Ok(entries)
    }

    async fn infer(
        &self,
        model_name: &str,
        request: &InferenceRequest,
    ) -> Result<InferenceOutput, ProviderError> {
        let mut generation_config = json!({});
        if let Some(temperature) = request.temperature {
            generation_config["temperature"] = json!(temperature);
        }
        if let Some(top_p) = request.top_p {
            generation_config["topP"] = json!(top_p);
        }
        if let Some(max_tokens) = request.max_tokens {
            generation_config["maxOutputTokens"] = json!(max_tokens);
        }
        if let Some(stop) = &request.stop_sequences {
            if !stop.is_empty() {
                generation_config["stopSequences"] = json!(stop);
            }
        }

        let mut body = json!({
            "contents": [{"role": "user", "parts": [{"text": request.prompt}]}],
            "generationConfig": generation_config,
        });
        if let Some(system) = &request.system_prompt {
            body["systemInstruction"] = json!({"parts": [{"text": system}]});
        }

        let url = format!(
            "{}/{}/models/{}:generateContent?key={}",
            self.config.base_url, API_VERSION, model_name, self.config.api_key
        );
        let body = self.read(self.http.post(url).json(&body).send().await).await?;
        let response: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::unknown(Provider::Google, format!("malformed generation body: {e}"))
        })?;

        let text: String = response
            .candidates
            .iter()
            .filter_map(|candidate| candidate.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.is_empty() {
            if let Some(reason) = response
                .prompt_feedback
                .as_ref()
                .and_then(|feedback| feedback.block_reason.as_deref())
            {
                return Err(ProviderError::content_policy(
                    Provider::Google,
                    format!("request blocked: {reason}"),
                ));
            }
        }

        let usage = response
            .usage_metadata
            .map(|u| TokenUsage {
                prompt: u.prompt_token_count,
                completion: u.candidates_token_count,
                total: u.total_token_count,
            })
            .unwrap_or_default();
        Ok(InferenceOutput { text, usage })
    }
}
