//! Provider registry
//!
//! Maps a parsed provider tag plus a credential onto a concrete adapter.
//! Adding a provider means adding one build arm here and one adapter
//! module; no dispatch code elsewhere changes.

use crate::core::error::ProviderError;
use crate::core::providers::anthropic::{AnthropicConfig, AnthropicProvider};
use crate::core::providers::gemini::{GeminiConfig, GeminiProvider};
use crate::core::providers::groq::{GroqConfig, GroqProvider};
use crate::core::providers::huggingface::{HuggingFaceConfig, HuggingFaceProvider};
use crate::core::providers::mistral::{MistralConfig, MistralProvider};
use crate::core::providers::openai::{OpenAIConfig, OpenAIProvider};
use crate::core::providers::LLMProvider;
use crate::core::traits::CredentialSource;
use crate::core::types::Provider;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves model identifiers to adapter instances.
///
/// Adapters share one connection-pooled HTTP client and are constructed
/// per resolution: credentials arrive with the request and are never
/// retained between calls.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    http: reqwest::Client,
    base_urls: HashMap<Provider, String>,
}

impl ProviderRegistry {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_urls: HashMap::new(),
        }
    }

    /// Point one provider at a different endpoint. Used for self-hosted
    /// OpenAI-compatible gateways and by the test suite.
    pub fn with_base_url(mut self, provider: Provider, base_url: impl Into<String>) -> Self {
        self.base_urls.insert(provider, base_url.into());
        self
    }

    /// Resolve an adapter for `provider`, or fail with
    /// `MissingCredential` when the credential source has nothing for it.
    pub async fn resolve(
        &self,
        provider: Provider,
        credentials: &dyn CredentialSource,
    ) -> Result<Arc<dyn LLMProvider>, ProviderError> {
        let Some(api_key) = credentials.get_credential(provider).await else {
            return Err(ProviderError::missing_credential(provider));
        };
        Ok(self.build(provider, api_key))
    }

    fn build(&self, provider: Provider, api_key: String) -> Arc<dyn LLMProvider> {
        let base_url = self.base_urls.get(&provider).cloned();
        match provider {
            Provider::OpenAI => {
                let mut config = OpenAIConfig::new(api_key);
                if let Some(url) = base_url {
                    config.base_url = url;
                }
                Arc::new(OpenAIProvider::new(self.http.clone(), config))
            }
            Provider::Google => {
                let mut config = GeminiConfig::new(api_key);
                if let Some(url) = base_url {
                    config.base_url = url;
                }
                Arc::new(GeminiProvider::new(self.http.clone(), config))
            }
            Provider::Anthropic => {
                let mut config = AnthropicConfig::new(api_key);
                if let Some(url) = base_url {
                    config.base_url = url;
                }
                Arc::new(AnthropicProvider::new(self.http.clone(), config))
            }
            Provider::Mistral => {
                let mut config = MistralConfig::new(api_key);
                if let Some(url) = base_url {
                    config.base_url = url;
                }
                Arc::new(MistralProvider::new(self.http.clone(), config))
            }
            Provider::Groq => {
                let mut config = GroqConfig::new(api_key);
                if let Some(url) = base_url {
                    config.base_url = url;
                }
                Arc::new(GroqProvider::new(self.http.clone(), config))
            }
            Provider::HuggingFace => {
                let mut config = HuggingFaceConfig::new(api_key);
                if let Some(url) = base_url {
                    // The test override points both the inference and hub
                    // endpoints at the same double.
                    config.base_url = url.clone();
                    config.hub_url = url;
                }
                Arc::new(HuggingFaceProvider::new(self.http.clone(), config))
            }
        }
    }
}
