use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// One submission: which model to run on which input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictRequest {
    pub model: String,
    pub input: PathBuf,
}

impl PredictRequest {
    pub fn new(model: impl Into<String>, input: impl Into<PathBuf>) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
        }
    }
}

/// A prediction call that produced no [`classifier_core::Response`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct PredictError {
    pub kind: FailureKind,
    pub message: String,
}

impl PredictError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidRequest,
    Network,
    Timeout,
    HttpStatus(u16),
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Spawn,
    Exit { code: Option<i32> },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidRequest => write!(f, "invalid request"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "undecodable response"),
            FailureKind::Spawn => write!(f, "failed to start model runner"),
            FailureKind::Exit { code: Some(code) } => write!(f, "model runner exited with {code}"),
            FailureKind::Exit { code: None } => write!(f, "model runner killed by signal"),
        }
    }
}
