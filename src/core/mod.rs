//! Inference orchestration core
//!
//! Layering, leaves first: `types` and `error` are shared vocabulary;
//! `providers` holds the per-vendor adapters and the registry; `catalog`,
//! `response_cache`, and `retry` are the reliability wrappers; the
//! `orchestrator` composes them. `rate_limiter` guards the ingress and is
//! independent of the inference pipeline.

pub mod catalog;
pub mod error;
pub mod orchestrator;
pub mod providers;
pub mod rate_limiter;
pub mod response_cache;
pub mod retry;
pub mod traits;
pub mod types;
