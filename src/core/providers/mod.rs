//! Provider adapters
//!
//! One adapter per LLM vendor, all implementing the [`LLMProvider`]
//! contract. Adapters translate a normalized [`InferenceRequest`] into one
//! vendor call and the vendor response back into an [`InferenceOutput`] or
//! a normalized [`ProviderError`]; retries, caching, and comparison logic
//! all live above this layer.

pub mod anthropic;
pub mod gemini;
pub mod groq;
pub mod huggingface;
pub mod mistral;
pub mod openai;

pub mod registry;
pub mod shared;

pub use registry::ProviderRegistry;

use crate::core::error::ProviderError;
use crate::core::types::{CatalogEntry, InferenceRequest, Provider, TokenUsage};
use async_trait::async_trait;

/// Raw adapter output before the orchestrator wraps it into a result
/// envelope with timing and error normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceOutput {
    pub text: String,
    pub usage: TokenUsage,
}

/// Uniform capability surface over one LLM vendor.
///
/// Implementations must issue exactly one vendor call per `infer`
/// invocation and classify every failure into the closed taxonomy at this
/// boundary; no raw vendor error escapes an adapter.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Stable lowercase vendor token, matching `Provider::token()`.
    fn name(&self) -> &'static str;

    fn provider(&self) -> Provider;

    /// Models this vendor currently offers.
    async fn list_models(&self) -> Result<Vec<CatalogEntry>, ProviderError>;

    /// Run one completion against `model_name`.
    async fn infer(
        &self,
        model_name: &str,
        request: &InferenceRequest,
    ) -> Result<InferenceOutput, ProviderError>;
}
