//! HTTP-facing surface
//!
//! The API layer itself (routing, persistence-backed handlers) lives in
//! the embedding service; this crate contributes only the ingress
//! middleware that fronts it.

pub mod middleware;
