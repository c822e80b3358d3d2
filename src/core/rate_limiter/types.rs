//! Rate limiter configuration and decision types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// One admission rule: at most `max_requests` within `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimit {
    pub const fn per_minute(max_requests: u32) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(60),
        }
    }
}

/// Limit table resolved in order: exact-route override, then HTTP-method
/// default, then the global default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub default: RateLimit,
    pub method_overrides: HashMap<String, RateLimit>,
    pub route_overrides: HashMap<String, RateLimit>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        let route_overrides = HashMap::from([
            // Credential exchange gets the strictest budget.
            ("/api/v1/token".to_string(), RateLimit::per_minute(10)),
            ("/api/v1/interact".to_string(), RateLimit::per_minute(30)),
            ("/api/v1/compare".to_string(), RateLimit::per_minute(20)),
        ]);
        let method_overrides = HashMap::from([
            ("POST".to_string(), RateLimit::per_minute(40)),
            ("PUT".to_string(), RateLimit::per_minute(40)),
            ("DELETE".to_string(), RateLimit::per_minute(30)),
        ]);
        Self {
            default: RateLimit::per_minute(60),
            method_overrides,
            route_overrides,
        }
    }
}

impl RateLimitConfig {
    /// The limit governing `method route`.
    pub fn resolve(&self, method: &str, route: &str) -> RateLimit {
        if let Some(limit) = self.route_overrides.get(route) {
            return *limit;
        }
        if let Some(limit) = self.method_overrides.get(&method.to_uppercase()) {
            return *limit;
        }
        self.default
    }
}

/// Admission verdict for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// The limit that applied after resolution.
    pub limit: u32,
    pub window_secs: u64,
    pub remaining: u32,
    /// Seconds until the oldest in-window request ages out; set only on
    /// rejection.
    pub retry_after_secs: Option<u64>,
}

/// Client identity for rate-limiting keys: the first forwarded-for entry
/// when present (requests arrive through a proxy in the usual deployment),
/// else the raw peer address.
pub fn client_identifier(forwarded_for: Option<&str>, peer: Option<&str>) -> String {
    if let Some(forwarded) = forwarded_for {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    peer.unwrap_or("0.0.0.0").to_string()
}
