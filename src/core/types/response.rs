//! Normalized inference results

use crate::core::error::ErrorKind;
use crate::core::types::ModelId;
use serde::{Deserialize, Serialize};

/// Token accounting as reported by the vendor.
///
/// Every field is optional: some providers report nothing, some only a
/// total. Counts are never fabricated on the client side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt: Option<u32>,
    pub completion: Option<u32>,
    pub total: Option<u32>,
}

impl TokenUsage {
    /// Usage from separate prompt/completion counts, deriving the total
    /// when both are known.
    pub fn from_parts(prompt: Option<u32>, completion: Option<u32>) -> Self {
        let total = match (prompt, completion) {
            (Some(p), Some(c)) => Some(p + c),
            _ => None,
        };
        Self {
            prompt,
            completion,
            total,
        }
    }
}

/// The normalized failure carried inside an [`InferenceResult`].
///
/// `message` is the short human-readable text for the error kind, never a
/// raw vendor payload or a stack trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Outcome envelope of one inference call.
///
/// Both `text` and `error` are always present structurally; `error` being
/// set signals failure (in which case `text` is empty). This shape lets a
/// comparison report "side A failed, side B succeeded" as a plain value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    pub model_id: ModelId,
    pub text: String,
    #[serde(default)]
    pub error: Option<InferenceError>,
    pub elapsed_secs: f64,
    #[serde(default)]
    pub usage: TokenUsage,
}

impl InferenceResult {
    pub fn success(
        model_id: ModelId,
        text: String,
        usage: TokenUsage,
        elapsed_secs: f64,
    ) -> Self {
        Self {
            model_id,
            text,
            error: None,
            elapsed_secs,
            usage,
        }
    }

    pub fn failure(model_id: ModelId, error: InferenceError, elapsed_secs: f64) -> Self {
        Self {
            model_id,
            text: String::new(),
            error: Some(error),
            elapsed_secs,
            usage: TokenUsage::default(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
