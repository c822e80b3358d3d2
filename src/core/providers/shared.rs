//! Shared wire helpers for OpenAI-compatible chat endpoints
//!
//! OpenAI, Groq, and Mistral speak the same chat-completions dialect with
//! minor differences, captured here once. Vendor-specific wire formats
//! (Anthropic, Gemini, the hub inference API) live in their own modules.

use crate::core::error::{ProviderError, classify_status};
use crate::core::providers::InferenceOutput;
use crate::core::types::{InferenceRequest, Provider, TokenUsage};
use serde::Deserialize;
use serde_json::{Value, json};

/// Dialect switches for [`chat_body`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct WireOptions {
    /// Attach the system prompt as a leading `system` message.
    pub system_message: bool,
    /// Send frequency/presence penalties (Mistral rejects them).
    pub penalties: bool,
}

impl Default for WireOptions {
    fn default() -> Self {
        Self {
            system_message: true,
            penalties: true,
        }
    }
}

/// Build a chat-completions request body, omitting unset optional
/// parameters entirely.
pub(crate) fn chat_body(model: &str, request: &InferenceRequest, options: WireOptions) -> Value {
    let mut messages = Vec::new();
    if options.system_message {
        if let Some(system) = &request.system_prompt {
            messages.push(json!({"role": "system", "content": system}));
        }
    }
    messages.push(json!({"role": "user", "content": request.prompt}));

    let mut body = json!({
        "model": model,
        "messages": messages,
    });
    if let Some(temperature) = request.temperature {
        body["temperature"] = json!(temperature);
    }
    if let Some(max_tokens) = request.max_tokens {
        body["max_tokens"] = json!(max_tokens);
    }
    if let Some(top_p) = request.top_p {
        body["top_p"] = json!(top_p);
    }
    if options.penalties {
        if let Some(frequency_penalty) = request.frequency_penalty {
            body["frequency_penalty"] = json!(frequency_penalty);
        }
        if let Some(presence_penalty) = request.presence_penalty {
            body["presence_penalty"] = json!(presence_penalty);
        }
    }
    if let Some(stop) = &request.stop_sequences {
        if !stop.is_empty() {
            body["stop"] = json!(stop);
        }
    }
    body
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

/// Parse a successful chat-completions body.
pub(crate) fn parse_chat_completion(
    provider: Provider,
    body: &str,
) -> Result<InferenceOutput, ProviderError> {
    let completion: ChatCompletion = serde_json::from_str(body)
        .map_err(|e| ProviderError::unknown(provider, format!("malformed completion body: {e}")))?;
    let text = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default();
    let usage = completion
        .usage
        .map(|u| TokenUsage {
            prompt: u.prompt_tokens,
            completion: u.completion_tokens,
            total: u.total_tokens,
        })
        .unwrap_or_default();
    Ok(InferenceOutput { text, usage })
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelListEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelListEntry {
    id: String,
}

/// Parse a `GET /models` body into bare model ids.
pub(crate) fn parse_model_list(provider: Provider, body: &str) -> Result<Vec<String>, ProviderError> {
    let list: ModelList = serde_json::from_str(body)
        .map_err(|e| ProviderError::unknown(provider, format!("malformed model list: {e}")))?;
    Ok(list.data.into_iter().map(|entry| entry.id).collect())
}

/// Drain a vendor response: transport failures become transient errors,
/// non-success statuses are classified, and the body text is returned
/// otherwise.
pub(crate) async fn read_response(
    provider: Provider,
    response: Result<reqwest::Response, reqwest::Error>,
) -> Result<String, ProviderError> {
    let response = response.map_err(|e| ProviderError::from_reqwest(provider, e))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::from_reqwest(provider, e))?;
    if !status.is_success() {
        return Err(classify_status(provider, status.as_u16(), &body));
    }
    Ok(body)
}
