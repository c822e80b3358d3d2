//! Collaborator seams
//!
//! The orchestration layer never persists credentials or prompt defaults;
//! both arrive through these traits so embedders can back them with
//! whatever store they run (the arena service keeps them in its database).

use crate::core::types::{ModelId, Provider};
use async_trait::async_trait;
use std::collections::HashMap;

/// Supplies per-provider API keys.
///
/// Returning `None` means "provider unavailable": when assembling a
/// catalog across all providers the orchestrator skips the provider
/// silently rather than treating it as an error.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn get_credential(&self, provider: Provider) -> Option<String>;
}

/// Supplies a default system prompt per model, consulted only when the
/// caller's request does not carry an explicit one.
#[async_trait]
pub trait SystemPromptSource: Send + Sync {
    async fn default_system_prompt(&self, model: &ModelId) -> Option<String>;
}

/// In-memory credential map, for embedders and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    keys: HashMap<Provider, String>,
}

impl StaticCredentials {
    pub fn new(keys: impl IntoIterator<Item = (Provider, String)>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }
}

#[async_trait]
impl CredentialSource for StaticCredentials {
    async fn get_credential(&self, provider: Provider) -> Option<String> {
        self.keys.get(&provider).cloned()
    }
}

/// Credentials read from the conventional environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl EnvCredentials {
    fn var_name(provider: Provider) -> &'static str {
        match provider {
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Google => "GOOGLE_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Mistral => "MISTRAL_API_KEY",
            Provider::Groq => "GROQ_API_KEY",
            Provider::HuggingFace => "HF_TOKEN",
        }
    }
}

#[async_trait]
impl CredentialSource for EnvCredentials {
    async fn get_credential(&self, provider: Provider) -> Option<String> {
        std::env::var(Self::var_name(provider))
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Prompt source that never supplies a default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDefaultPrompts;

#[async_trait]
impl SystemPromptSource for NoDefaultPrompts {
    async fn default_system_prompt(&self, _model: &ModelId) -> Option<String> {
        None
    }
}
