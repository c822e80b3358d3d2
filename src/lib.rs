//! # Prompt Arena
//!
//! Inference orchestration core for side-by-side LLM comparison. One
//! uniform interface submits a prompt to any supported provider, compares
//! two providers' answers concurrently, and returns normalized results
//! even though every vendor exposes a different API, error model, and
//! capability set.
//!
//! ## What lives here
//!
//! - **Provider adapters** behind one `{list_models, infer}` contract:
//!   OpenAI, Google (Gemini), Anthropic, Mistral, Groq, and the Hugging
//!   Face hub inference API
//! - **Model catalog cache** with single-flighted refresh and
//!   stale-on-failure fallback
//! - **Response cache** for deterministic (near-zero-temperature)
//!   requests
//! - **Retry executor** with bounded exponential backoff on transient
//!   failures only
//! - **Comparison orchestrator** with strict failure isolation between
//!   the two sides
//! - **Sliding-window rate limiter** plus an actix-web middleware
//!
//! Persistence, authentication, and credential storage are the embedding
//! service's concern; they reach this crate only through the
//! [`CredentialSource`] and [`SystemPromptSource`] seams.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use prompt_arena::{InferenceRequest, Orchestrator, Provider, StaticCredentials};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = StaticCredentials::new([
//!         (Provider::OpenAI, "sk-...".to_string()),
//!         (Provider::Anthropic, "sk-ant-...".to_string()),
//!     ]);
//!     let arena = Orchestrator::builder()
//!         .with_credentials(credentials)
//!         .build()?;
//!
//!     let request = InferenceRequest::new("Explain borrowing in Rust").with_temperature(0.2);
//!     let (left, right) = arena
//!         .compare(
//!             (&"openai/gpt-4o".parse()?, &request),
//!             (&"anthropic/claude-3-5-sonnet-20240620".parse()?, &request),
//!         )
//!         .await;
//!
//!     println!("gpt-4o: {}", left.text);
//!     println!("claude: {}", right.text);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod server;
pub mod utils;

pub use crate::config::OrchestratorConfig;
pub use crate::core::error::{ErrorKind, ProviderError};
pub use crate::core::orchestrator::{Orchestrator, OrchestratorBuilder, SetupError};
pub use crate::core::providers::{InferenceOutput, LLMProvider, ProviderRegistry};
pub use crate::core::rate_limiter::{
    RateLimit, RateLimitConfig, RateLimitDecision, SlidingWindowLimiter, client_identifier,
};
pub use crate::core::retry::RetryConfig;
pub use crate::core::traits::{
    CredentialSource, EnvCredentials, NoDefaultPrompts, StaticCredentials, SystemPromptSource,
};
pub use crate::core::types::{
    CatalogEntry, InferenceError, InferenceRequest, InferenceResult, ModelCapabilities, ModelId,
    Provider, TokenUsage,
};
pub use crate::server::middleware::RateLimitMiddleware;

/// Current version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
