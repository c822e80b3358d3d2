//! Sliding-window admission control

use super::types::{RateLimitConfig, RateLimitDecision};
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::warn;

/// Sliding-window request limiter keyed by `(client, route)`.
///
/// Check and record happen under one lock acquisition; a separate
/// check-then-record pair would race between concurrent requests from the
/// same client.
pub struct SlidingWindowLimiter {
    config: RateLimitConfig,
    windows: RwLock<HashMap<String, Vec<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: RwLock::new(HashMap::new()),
        }
    }

    /// Admit or reject one request, recording it when admitted.
    pub async fn check_and_record(
        &self,
        client: &str,
        method: &str,
        route: &str,
    ) -> RateLimitDecision {
        let limit = self.config.resolve(method, route);
        let now = Instant::now();
        let window_start = now - limit.window;
        let key = format!("{client}:{route}");

        let mut windows = self.windows.write().await;
        let stamps = windows.entry(key).or_default();
        // Timestamps are appended in order, so after pruning the first
        // element is the oldest in-window request.
        stamps.retain(|&stamp| stamp > window_start);

        let current = stamps.len() as u32;
        if current >= limit.max_requests {
            let oldest = stamps.first().copied().unwrap_or(now);
            let retry_after = limit
                .window
                .saturating_sub(now.duration_since(oldest))
                .as_secs()
                .max(1);
            warn!(
                client,
                route,
                current,
                limit = limit.max_requests,
                "rate limit exceeded"
            );
            return RateLimitDecision {
                allowed: false,
                limit: limit.max_requests,
                window_secs: limit.window.as_secs(),
                remaining: 0,
                retry_after_secs: Some(retry_after),
            };
        }

        stamps.push(now);
        RateLimitDecision {
            allowed: true,
            limit: limit.max_requests,
            window_secs: limit.window.as_secs(),
            remaining: limit.max_requests - current - 1,
            retry_after_secs: None,
        }
    }

    /// Drop windows with no in-window timestamps left. Callers may run
    /// this periodically to keep idle clients from accumulating.
    pub async fn prune(&self) {
        let max_window = self
            .config
            .route_overrides
            .values()
            .chain(self.config.method_overrides.values())
            .chain(std::iter::once(&self.config.default))
            .map(|limit| limit.window)
            .max()
            .unwrap_or_default();
        let cutoff = Instant::now() - max_window;

        let mut windows = self.windows.write().await;
        windows.retain(|_, stamps| {
            stamps.retain(|&stamp| stamp > cutoff);
            !stamps.is_empty()
        });
    }
}
