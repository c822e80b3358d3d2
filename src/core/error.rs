//! Normalized provider error taxonomy
//!
//! Every vendor failure is folded into the closed set below at the adapter
//! boundary. The substring heuristics in [`classify_message`] are the only
//! place in the crate where error text is pattern-matched; adapters consult
//! them as a fallback when the vendor response carries no structured error,
//! and nothing above the adapter layer ever inspects raw messages.

use crate::core::types::Provider;
use serde::{Deserialize, Serialize};

/// Serializable mirror of the [`ProviderError`] variants, carried inside
/// result envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownProvider,
    MissingCredential,
    Authentication,
    ModelNotFound,
    RateLimited,
    ContextTooLarge,
    ContentPolicy,
    TransientNetwork,
    Unknown,
}

/// Normalized provider failure.
///
/// The set is closed: adapters must map every vendor condition onto one of
/// these variants and never invent new ones per provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("unknown provider in model identifier '{token}'")]
    UnknownProvider { token: String },

    #[error("no credential configured for {provider}")]
    MissingCredential { provider: Provider },

    #[error("authentication failed for {provider}: {message}")]
    Authentication { provider: Provider, message: String },

    #[error("model '{model}' not found at {provider}")]
    ModelNotFound { provider: Provider, model: String },

    #[error("rate limited by {provider}: {message}")]
    RateLimited {
        provider: Provider,
        message: String,
        retry_after: Option<u64>,
    },

    #[error("context window exceeded for {provider}: {message}")]
    ContextTooLarge { provider: Provider, message: String },

    #[error("content policy rejection from {provider}: {message}")]
    ContentPolicy { provider: Provider, message: String },

    #[error("network failure contacting {provider}: {message}")]
    TransientNetwork { provider: Provider, message: String },

    #[error("unexpected failure from {provider}: {message}")]
    Unknown { provider: Provider, message: String },
}

impl ProviderError {
    pub fn unknown_provider(token: impl Into<String>) -> Self {
        Self::UnknownProvider {
            token: token.into(),
        }
    }

    pub fn missing_credential(provider: Provider) -> Self {
        Self::MissingCredential { provider }
    }

    pub fn authentication(provider: Provider, message: impl Into<String>) -> Self {
        Self::Authentication {
            provider,
            message: message.into(),
        }
    }

    pub fn model_not_found(provider: Provider, model: impl Into<String>) -> Self {
        Self::ModelNotFound {
            provider,
            model: model.into(),
        }
    }

    pub fn rate_limited(
        provider: Provider,
        message: impl Into<String>,
        retry_after: Option<u64>,
    ) -> Self {
        Self::RateLimited {
            provider,
            message: message.into(),
            retry_after,
        }
    }

    pub fn context_too_large(provider: Provider, message: impl Into<String>) -> Self {
        Self::ContextTooLarge {
            provider,
            message: message.into(),
        }
    }

    pub fn content_policy(provider: Provider, message: impl Into<String>) -> Self {
        Self::ContentPolicy {
            provider,
            message: message.into(),
        }
    }

    pub fn transient_network(provider: Provider, message: impl Into<String>) -> Self {
        Self::TransientNetwork {
            provider,
            message: message.into(),
        }
    }

    pub fn unknown(provider: Provider, message: impl Into<String>) -> Self {
        Self::Unknown {
            provider,
            message: message.into(),
        }
    }

    /// Map a `reqwest` transport failure onto the taxonomy.
    pub fn from_reqwest(provider: Provider, err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            Self::transient_network(provider, err.to_string())
        } else {
            Self::unknown(provider, err.to_string())
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownProvider { .. } => ErrorKind::UnknownProvider,
            Self::MissingCredential { .. } => ErrorKind::MissingCredential,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::ModelNotFound { .. } => ErrorKind::ModelNotFound,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::ContextTooLarge { .. } => ErrorKind::ContextTooLarge,
            Self::ContentPolicy { .. } => ErrorKind::ContentPolicy,
            Self::TransientNetwork { .. } => ErrorKind::TransientNetwork,
            Self::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// Whether the retry executor may re-attempt after this failure.
    ///
    /// Network failures always qualify. Rate limits and unclassified errors
    /// qualify only when their raw message matches the transient heuristic;
    /// every other kind fails fast because retrying cannot change the
    /// outcome.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::TransientNetwork { .. } => true,
            Self::RateLimited { message, .. } | Self::Unknown { message, .. } => {
                is_transient_message(message)
            }
            _ => false,
        }
    }

    /// Short user-facing text for this failure.
    ///
    /// Never includes vendor payloads; the technical detail stays in logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::UnknownProvider { token } => {
                format!("Unknown provider in model identifier '{token}'.")
            }
            Self::MissingCredential { provider } => format!(
                "No API key is configured for {}. Add one in the provider settings.",
                provider.display_name()
            ),
            Self::Authentication { provider, .. } => format!(
                "Authentication with {} failed. Check the configured API key.",
                provider.display_name()
            ),
            Self::ModelNotFound { provider, model } => format!(
                "Model '{model}' was not found at {}.",
                provider.display_name()
            ),
            Self::RateLimited {
                provider,
                retry_after,
                ..
            } => match retry_after {
                Some(secs) => format!(
                    "{} is rate limiting requests. Try again in {secs} seconds.",
                    provider.display_name()
                ),
                None => format!(
                    "{} is rate limiting requests. Try again later.",
                    provider.display_name()
                ),
            },
            Self::ContextTooLarge { .. } => {
                "The request exceeds the model's context limit. Shorten the prompt.".to_string()
            }
            Self::ContentPolicy { provider, .. } => format!(
                "The request was declined by {}'s content policy. Adjust the prompt.",
                provider.display_name()
            ),
            Self::TransientNetwork { provider, .. } => format!(
                "A network error occurred while contacting {}. Try again later.",
                provider.display_name()
            ),
            Self::Unknown { .. } => {
                "An internal error occurred while processing the request.".to_string()
            }
        }
    }
}

/// Phrases that mark a raw vendor message as a condition worth retrying.
const TRANSIENT_PHRASES: [&str; 6] = [
    "timeout",
    "currently loading",
    "temporarily unavailable",
    "too many requests",
    "rate limit",
    "retry",
];

/// The transient-condition heuristic applied to raw vendor messages.
pub fn is_transient_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    TRANSIENT_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Substring-based classification fallback for unstructured vendor errors.
///
/// Returns `None` when nothing in the text is recognizable, in which case
/// the caller keeps its status-derived classification.
pub fn classify_message(provider: Provider, message: &str) -> Option<ProviderError> {
    let lower = message.to_lowercase();
    if lower.contains("context")
        && (lower.contains("length") || lower.contains("size") || lower.contains("too long"))
    {
        return Some(ProviderError::context_too_large(provider, message));
    }
    if lower.contains("content policy")
        || lower.contains("moderation")
        || lower.contains("harmful")
        || lower.contains("safety")
    {
        return Some(ProviderError::content_policy(provider, message));
    }
    if lower.contains("currently loading")
        || lower.contains("unavailable")
        || lower.contains("timeout")
        || lower.contains("timed out")
    {
        return Some(ProviderError::transient_network(provider, message));
    }
    if lower.contains("rate limit") || lower.contains("too many requests") {
        return Some(ProviderError::rate_limited(provider, message, None));
    }
    if lower.contains("api key")
        || lower.contains("unauthorized")
        || lower.contains("authentication")
    {
        return Some(ProviderError::authentication(provider, message));
    }
    None
}

/// Classify a non-success HTTP response by status code, with the message
/// fallback for ambiguous 4xx bodies.
pub fn classify_status(provider: Provider, status: u16, body: &str) -> ProviderError {
    let message = vendor_message(body).unwrap_or_else(|| truncate(body, 200));
    match status {
        401 | 403 => ProviderError::authentication(provider, message),
        404 => ProviderError::model_not_found(provider, message),
        408 => ProviderError::transient_network(provider, message),
        413 => ProviderError::context_too_large(provider, message),
        429 => {
            let retry_after = retry_after_from_body(body);
            let message =
                vendor_message(body).unwrap_or_else(|| "Too many requests".to_string());
            ProviderError::rate_limited(provider, message, retry_after)
        }
        400 | 422 => classify_message(provider, &message)
            .unwrap_or_else(|| ProviderError::unknown(provider, message)),
        500..=599 => ProviderError::transient_network(provider, message),
        _ => ProviderError::unknown(provider, message),
    }
}

/// Pull a human-oriented message out of a vendor error body, trying the
/// common shapes: `{"error": {"message": ...}}`, `{"error": "..."}`,
/// `{"message": ...}`, `{"detail": ...}`.
pub fn vendor_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    if let Some(error) = value.get("error") {
        if let Some(message) = error.get("message").and_then(|m| m.as_str()) {
            return Some(message.to_string());
        }
        if let Some(message) = error.as_str() {
            return Some(message.to_string());
        }
    }
    for field in ["message", "detail"] {
        if let Some(message) = value.get(field).and_then(|m| m.as_str()) {
            return Some(message.to_string());
        }
    }
    None
}

fn retry_after_from_body(body: &str) -> Option<u64> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("retry_after")
        .or_else(|| value.get("error").and_then(|e| e.get("retry_after")))
        .and_then(|r| r.as_u64())
}

fn truncate(text: &str, limit: usize) -> String {
    let trimmed = text.trim();
    if trimmed.len() <= limit {
        trimmed.to_string()
    } else {
        let mut end = limit;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &trimmed[..end])
    }
}
