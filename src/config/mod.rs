//! Orchestration settings
//!
//! Everything has a sensible default; `from_env` overlays `ARENA_*`
//! environment variables (a `.env` file is honored) so deployments can
//! tune caching and retry behavior without code changes.

use crate::core::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Applied when a request does not set `max_tokens`.
    pub default_max_tokens: u32,
    /// Applied when a request does not set `temperature`.
    pub default_temperature: f32,
    /// Results are cached only when the effective temperature is at or
    /// below this threshold.
    pub determinism_threshold: f32,
    /// TTL for per-provider model catalogs.
    pub models_cache_ttl: Duration,
    /// TTL for cached inference results.
    pub response_cache_ttl: Duration,
    pub retry: RetryConfig,
    /// Hard bound on each vendor HTTP call, and therefore on each retry
    /// attempt.
    pub http_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            default_max_tokens: 1024,
            default_temperature: 0.7,
            determinism_threshold: 0.1,
            models_cache_ttl: Duration::from_secs(3600),
            response_cache_ttl: Duration::from_secs(86_400),
            retry: RetryConfig::default(),
            http_timeout: Duration::from_secs(60),
        }
    }
}

impl OrchestratorConfig {
    /// Defaults overlaid with `ARENA_*` environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        overlay(&mut config.default_max_tokens, "ARENA_DEFAULT_MAX_TOKENS");
        overlay(&mut config.default_temperature, "ARENA_DEFAULT_TEMPERATURE");
        overlay(
            &mut config.determinism_threshold,
            "ARENA_DETERMINISM_THRESHOLD",
        );
        overlay_secs(&mut config.models_cache_ttl, "ARENA_MODELS_CACHE_TTL");
        overlay_secs(&mut config.response_cache_ttl, "ARENA_RESPONSE_CACHE_TTL");
        overlay(&mut config.retry.max_retries, "ARENA_MAX_RETRIES");
        overlay_secs(&mut config.http_timeout, "ARENA_HTTP_TIMEOUT");
        config
    }
}

fn overlay<T: FromStr>(slot: &mut T, name: &str) {
    if let Ok(raw) = std::env::var(name) {
        match raw.parse() {
            Ok(value) => *slot = value,
            Err(_) => warn!(name, %raw, "ignoring unparsable environment override"),
        }
    }
}

fn overlay_secs(slot: &mut Duration, name: &str) {
    let mut secs = slot.as_secs();
    overlay(&mut secs, name);
    *slot = Duration::from_secs(secs);
}
