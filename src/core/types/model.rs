//! Model identifiers and catalog metadata

use crate::core::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported inference providers
///
/// This is a closed set: a model identifier naming anything else is a hard
/// parse error, never silently mapped to a default provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAI,
    Google,
    Anthropic,
    Mistral,
    Groq,
    HuggingFace,
}

impl Provider {
    /// Every supported provider, in catalog display order.
    pub const ALL: [Provider; 6] = [
        Provider::OpenAI,
        Provider::Google,
        Provider::Anthropic,
        Provider::Mistral,
        Provider::Groq,
        Provider::HuggingFace,
    ];

    /// Lowercase token used in model identifiers and cache key prefixes.
    pub fn token(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Google => "google",
            Provider::Anthropic => "anthropic",
            Provider::Mistral => "mistral",
            Provider::Groq => "groq",
            Provider::HuggingFace => "huggingface",
        }
    }

    /// Human-readable vendor name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::Google => "Google AI",
            Provider::Anthropic => "Anthropic (Claude)",
            Provider::Mistral => "Mistral AI",
            Provider::Groq => "Groq",
            Provider::HuggingFace => "Hugging Face Hub",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Provider {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "google" | "gemini" => Ok(Provider::Google),
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            "mistral" | "mistralai" => Ok(Provider::Mistral),
            "groq" => Ok(Provider::Groq),
            "huggingface" | "huggingface_hub" | "hf" => Ok(Provider::HuggingFace),
            _ => Err(ProviderError::unknown_provider(s)),
        }
    }
}

/// A fully qualified model identifier, parsed from `"provider/name"`.
///
/// The model name may itself contain slashes (hub models are namespaced as
/// `org/model`), so only the first separator is significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelId {
    pub provider: Provider,
    pub name: String,
}

impl ModelId {
    pub fn new(provider: Provider, name: impl Into<String>) -> Self {
        Self {
            provider,
            name: name.into(),
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.name)
    }
}

impl FromStr for ModelId {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // An identifier without a provider prefix is rejected outright.
        let Some((provider, name)) = s.split_once('/') else {
            return Err(ProviderError::unknown_provider(s));
        };
        if name.is_empty() {
            return Err(ProviderError::unknown_provider(s));
        }
        Ok(ModelId {
            provider: provider.parse()?,
            name: name.to_string(),
        })
    }
}

impl Serialize for ModelId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ModelId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Capability flags attached to a catalog entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCapabilities {
    pub supports_system_prompt: bool,
    pub supports_vision: bool,
    pub supports_tools: bool,
}

impl ModelCapabilities {
    /// Best-effort capability probe from the provider and model name.
    ///
    /// Several vendors return bare ids from their listing endpoints, so the
    /// catalog enriches entries from naming conventions. Hub models stay all
    /// false: their capabilities cannot be determined without extra requests.
    pub fn probe(provider: Provider, model_name: &str) -> Self {
        let name = model_name.to_lowercase();
        match provider {
            Provider::OpenAI => Self {
                supports_system_prompt: true,
                supports_vision: name.contains("vision") || name.contains("-o"),
                supports_tools: name.contains("gpt-4") || name.contains("turbo"),
            },
            Provider::Anthropic => Self {
                supports_system_prompt: true,
                supports_vision: name.contains("claude-3"),
                supports_tools: false,
            },
            Provider::Google => Self {
                supports_system_prompt: true,
                supports_vision: name.contains("vision") || name.contains("pro"),
                supports_tools: false,
            },
            Provider::Mistral => Self {
                supports_system_prompt: true,
                ..Self::default()
            },
            Provider::Groq => Self {
                supports_system_prompt: !name.contains("llama"),
                ..Self::default()
            },
            Provider::HuggingFace => Self::default(),
        }
    }
}

/// Best-effort context-window size from the provider and model name.
pub fn max_input_tokens(provider: Provider, model_name: &str) -> Option<u32> {
    let name = model_name.to_lowercase();
    match provider {
        Provider::OpenAI => {
            if name.contains("gpt-4") {
                Some(if name.contains("128k") { 128_000 } else { 8_192 })
            } else if name.contains("gpt-3.5") {
                Some(if name.contains("16k") { 16_384 } else { 4_096 })
            } else {
                None
            }
        }
        Provider::Anthropic => {
            if name.contains("claude-3") {
                Some(if name.contains("opus") { 200_000 } else { 100_000 })
            } else if name.contains("claude-2") {
                Some(100_000)
            } else {
                None
            }
        }
        Provider::Google => {
            if name.contains("gemini") {
                Some(if name.contains("pro") { 30_720 } else { 8_192 })
            } else {
                None
            }
        }
        Provider::Mistral => Some(if name.contains("large") { 32_768 } else { 8_192 }),
        Provider::Groq => Some(8_192),
        Provider::HuggingFace => None,
    }
}

/// Rough category tag used by clients to group catalog entries.
pub fn guess_category(provider: Provider, model_name: &str) -> &'static str {
    let name = model_name.to_lowercase();
    if name.contains("embedding") {
        return "embeddings";
    }
    if name.contains("code") || name.contains("coder") || name.contains("codex") {
        return "programming";
    }
    match provider {
        Provider::HuggingFace => {
            if name.contains("translate") || name.contains("translation") {
                "text_translation"
            } else if name.contains("summarization") || name.contains("summary") {
                "text_summary"
            } else if name.contains("diffusion") {
                "image_generation"
            } else {
                "text_generation"
            }
        }
        _ if name.contains("vision") || name.contains("claude-3") => "multimodal",
        _ => "text_generation",
    }
}

/// One model as advertised by a provider's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: ModelId,
    pub display_name: String,
    pub category: Option<String>,
    pub capabilities: ModelCapabilities,
    pub max_input_tokens: Option<u32>,
}

impl CatalogEntry {
    /// Build an entry for `provider/name`, enriched from the naming
    /// heuristics above.
    pub fn probe(provider: Provider, model_name: &str, display_name: Option<&str>) -> Self {
        Self {
            id: ModelId::new(provider, model_name),
            display_name: display_name.unwrap_or(model_name).to_string(),
            category: Some(guess_category(provider, model_name).to_string()),
            capabilities: ModelCapabilities::probe(provider, model_name),
            max_input_tokens: max_input_tokens(provider, model_name),
        }
    }
}
