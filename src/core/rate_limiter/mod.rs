//! Request-rate governance
//!
//! Sliding-window admission control evaluated before any provider work
//! begins. The limiter itself is transport-neutral; the actix middleware
//! in `server::middleware` translates its decisions into HTTP 429s.

mod limiter;
mod types;

pub use limiter::SlidingWindowLimiter;
pub use types::{RateLimit, RateLimitConfig, RateLimitDecision, client_identifier};
