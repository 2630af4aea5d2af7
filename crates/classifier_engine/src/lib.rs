//! Classifier engine: prediction backends and the async submission flow.
mod predictor;
mod sidecar;
mod submit;
mod types;

pub use predictor::{HttpPredictor, HttpSettings, Predictor};
pub use sidecar::{SidecarPredictor, SidecarSettings};
pub use submit::{submit, SubmitSettings};
pub use types::{FailureKind, PredictError, PredictRequest};
