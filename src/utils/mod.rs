//! Cross-cutting utilities

pub mod logging;
pub mod net;
