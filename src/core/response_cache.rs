//! Response cache for deterministic requests
//!
//! Caching a sampled completion would be semantically wrong (the same key
//! legitimately produces different outputs), so the orchestrator consults
//! this cache only when the effective temperature is at or below the
//! determinism threshold. Only fully successful results are stored.

use crate::core::types::{CacheEntry, InferenceRequest, InferenceResult, ModelId};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, info};

/// Cache key over the semantically relevant request fields. Prompt and
/// system prompt are digested so keys stay bounded; the provider token
/// prefix keeps per-provider segments separable for [`ResponseCache::clear`].
pub fn fingerprint(model: &ModelId, request: &InferenceRequest) -> String {
    let prompt_digest = hex::encode(Sha256::digest(request.prompt.as_bytes()));
    let system_digest = hex::encode(Sha256::digest(
        request.system_prompt.as_deref().unwrap_or("").as_bytes(),
    ));
    let max_tokens = request
        .max_tokens
        .map(|v| v.to_string())
        .unwrap_or_default();
    format!("{model}:{prompt_digest}:{max_tokens}:{system_digest}")
}

/// TTL cache of full inference results.
pub struct ResponseCache {
    ttl: Duration,
    entries: DashMap<String, CacheEntry<InferenceResult>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    /// Cached result for `key`, treating expired entries as misses.
    pub fn get(&self, key: &str) -> Option<InferenceResult> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.is_expired(self.ttl) => true,
            Some(entry) => {
                debug!(key, "response cache hit");
                return Some(entry.value.clone());
            }
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    /// Store a successful result. Error results must never be cached, so
    /// failures are ignored here rather than trusted to the caller.
    pub fn insert(&self, key: String, result: &InferenceResult) {
        if !result.is_success() {
            return;
        }
        self.entries.insert(key, CacheEntry::new(result.clone()));
    }

    /// Wipe the whole cache, or only keys under `prefix` (a provider
    /// segment such as `"openai/"`).
    pub fn clear(&self, prefix: Option<&str>) {
        match prefix {
            Some(prefix) => {
                self.entries.retain(|key, _| !key.starts_with(prefix));
                info!(prefix, "response cache segment cleared");
            }
            None => {
                self.entries.clear();
                info!("response cache cleared");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
