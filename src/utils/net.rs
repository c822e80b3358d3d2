//! HTTP client construction

use std::time::Duration;

const USER_AGENT: &str = concat!("prompt-arena/", env!("CARGO_PKG_VERSION"));

/// Build the shared vendor-facing client. The timeout is the per-attempt
/// deadline for every adapter call; the retry layer adds backoff on top
/// but never extends an individual attempt.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}
