//! Bounded retry with exponential backoff
//!
//! Applied around one adapter call at a time, outside the adapter and
//! inside the response cache. Only transient-classified failures are
//! re-attempted; everything else surfaces immediately because retrying
//! cannot change the outcome.

use crate::core::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Additional attempts after the first, not counting it.
    pub max_retries: u32,
    /// Delay before the first re-attempt.
    pub base_delay: Duration,
    /// Delay multiplier per attempt.
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(1500),
            backoff_factor: 2.0,
        }
    }
}

/// Run `op`, re-attempting transient failures up to `config.max_retries`
/// extra times with exponentially growing delays.
pub async fn retry_with_backoff<T, F, Fut>(
    config: &RetryConfig,
    mut op: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut delay = config.base_delay;
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_transient() || attempt >= config.max_retries {
                    if attempt > 0 {
                        warn!(
                            attempts = attempt + 1,
                            error = %err,
                            "giving up after repeated transient failures"
                        );
                    }
                    return Err(err);
                }
                info!(
                    attempt = attempt + 1,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient failure, backing off before retry"
                );
                tokio::time::sleep(delay).await;
                delay = delay.mul_f64(config.backoff_factor);
                attempt += 1;
            }
        }
    }
}
