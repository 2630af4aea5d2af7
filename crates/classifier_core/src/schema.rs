//! Wire-level shapes exchanged with the prediction service and rendered by views.

use serde::{Deserialize, Serialize};

pub const STYLE_ERROR: &str = "error";
pub const STYLE_INFO: &str = "info";
pub const STYLE_SUCCESS: &str = "success";

/// Transient UI notification. An empty `value` means nothing to display.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    pub value: String,
}

impl Message {
    /// The state a freshly created message cell holds: `{style: "", value: ""}`.
    pub fn empty() -> Self {
        Self::styled("", "")
    }

    fn styled(style: &str, value: impl Into<String>) -> Self {
        Self {
            style: Some(style.to_string()),
            value: value.into(),
        }
    }

    pub fn error(value: impl Into<String>) -> Self {
        Self::styled(STYLE_ERROR, value)
    }

    pub fn info(value: impl Into<String>) -> Self {
        Self::styled(STYLE_INFO, value)
    }

    pub fn success(value: impl Into<String>) -> Self {
        Self::styled(STYLE_SUCCESS, value)
    }

    /// Style name, with absence folded into the empty string.
    pub fn style_name(&self) -> &str {
        self.style.as_deref().unwrap_or("")
    }

    pub fn is_error(&self) -> bool {
        self.style_name() == STYLE_ERROR
    }

    pub fn is_blank(&self) -> bool {
        self.value.is_empty()
    }
}

/// One completed inference result with its full class distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub model: String,
    pub prediction: String,
    pub probability: f64,
    pub classes: Vec<String>,
    pub probabilities: Vec<f64>,
}

/// Envelope returned by the prediction service.
///
/// `result` is expected to be present exactly when `success` is true. This
/// type does not enforce that; see [`crate::validate_response`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default)]
    pub result: Option<Prediction>,
    #[serde(default)]
    pub message: String,
}

impl Response {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            message: message.into(),
        }
    }

    pub fn success(prediction: Prediction, message: impl Into<String>) -> Self {
        Self {
            success: true,
            result: Some(prediction),
            message: message.into(),
        }
    }
}
