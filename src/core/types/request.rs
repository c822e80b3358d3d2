//! Normalized inference request

use serde::{Deserialize, Serialize};

/// Range violation reported by [`InferenceRequest::validate`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid value for '{field}': {message}")]
pub struct InvalidParameter {
    pub field: &'static str,
    pub message: String,
}

/// A provider-agnostic inference request.
///
/// Built once via [`InferenceRequest::new`] and the `with_*` methods, then
/// treated as immutable. Unset optional parameters are omitted from vendor
/// payloads entirely rather than sent as nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
}

impl InferenceRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
            stop_sequences: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    pub fn with_presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    pub fn with_stop_sequences(mut self, stop: impl IntoIterator<Item = String>) -> Self {
        self.stop_sequences = Some(stop.into_iter().collect());
        self
    }

    /// Check sampling parameters against their documented ranges.
    ///
    /// The API layer calls this before admitting a request; adapters assume
    /// it has been done.
    pub fn validate(&self) -> Result<(), InvalidParameter> {
        fn check_range(
            field: &'static str,
            value: Option<f32>,
            min: f32,
            max: f32,
        ) -> Result<(), InvalidParameter> {
            if let Some(v) = value {
                if !(min..=max).contains(&v) {
                    return Err(InvalidParameter {
                        field,
                        message: format!("{v} is outside [{min}, {max}]"),
                    });
                }
            }
            Ok(())
        }

        if self.prompt.trim().is_empty() {
            return Err(InvalidParameter {
                field: "prompt",
                message: "prompt must not be empty".to_string(),
            });
        }
        check_range("temperature", self.temperature, 0.0, 2.0)?;
        check_range("top_p", self.top_p, 0.0, 1.0)?;
        check_range("frequency_penalty", self.frequency_penalty, -2.0, 2.0)?;
        check_range("presence_penalty", self.presence_penalty, -2.0, 2.0)?;
        Ok(())
    }
}
