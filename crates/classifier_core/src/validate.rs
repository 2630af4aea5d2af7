//! Checks a received [`Response`] against the envelope and distribution invariants
//! before anything derived from it is published.

use thiserror::Error;

use crate::{Prediction, Response};

/// Allowed deviation of the probability sum from 1, and of `probability`
/// from the largest entry of `probabilities`.
pub const DEFAULT_SUM_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationSettings {
    pub sum_tolerance: f64,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            sum_tolerance: DEFAULT_SUM_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResponseError {
    #[error("prediction service reported failure: {0}")]
    Failed(String),
    #[error("response reports success but carries no result")]
    MissingResult,
    #[error("response reports failure but carries a result")]
    UnexpectedResult,
    #[error("invalid prediction: {0}")]
    InvalidPrediction(#[from] PredictionError),
}

impl ResponseError {
    /// True when the service broke the envelope contract or sent an inconsistent result,
    /// as opposed to a well-formed failure report.
    pub fn is_contract_violation(&self) -> bool {
        !matches!(self, ResponseError::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("model name is empty")]
    EmptyModel,
    #[error("class list is empty")]
    EmptyClasses,
    #[error("{classes} classes but {probabilities} probabilities")]
    LengthMismatch { classes: usize, probabilities: usize },
    #[error("probability {value} at index {index} is outside [0, 1]")]
    OutOfRange { index: usize, value: f64 },
    #[error("reported probability {0} is outside [0, 1]")]
    ReportedOutOfRange(f64),
    #[error("probabilities sum to {sum}")]
    BadSum { sum: f64 },
    #[error("predicted label {0:?} is not one of the classes")]
    UnknownLabel(String),
    #[error("predicted label {label:?} is not the most likely class")]
    NotMostLikely { label: String },
    #[error("reported probability {reported} does not match distribution maximum {max}")]
    ProbabilityMismatch { reported: f64, max: f64 },
}

/// Returns the carried prediction when the response is a valid success.
pub fn validate_response<'a>(
    response: &'a Response,
    settings: &ValidationSettings,
) -> Result<&'a Prediction, ResponseError> {
    match (response.success, response.result.as_ref()) {
        (true, Some(prediction)) => {
            validate_prediction(prediction, settings)?;
            Ok(prediction)
        }
        (true, None) => Err(ResponseError::MissingResult),
        (false, Some(_)) => Err(ResponseError::UnexpectedResult),
        (false, None) => Err(ResponseError::Failed(response.message.clone())),
    }
}

pub fn validate_prediction(
    prediction: &Prediction,
    settings: &ValidationSettings,
) -> Result<(), PredictionError> {
    let tolerance = settings.sum_tolerance;

    if prediction.model.is_empty() {
        return Err(PredictionError::EmptyModel);
    }
    if prediction.classes.is_empty() {
        return Err(PredictionError::EmptyClasses);
    }
    if prediction.classes.len() != prediction.probabilities.len() {
        return Err(PredictionError::LengthMismatch {
            classes: prediction.classes.len(),
            probabilities: prediction.probabilities.len(),
        });
    }
    if !in_unit_range(prediction.probability) {
        return Err(PredictionError::ReportedOutOfRange(prediction.probability));
    }
    if let Some((index, &value)) = prediction
        .probabilities
        .iter()
        .enumerate()
        .find(|(_, p)| !in_unit_range(**p))
    {
        return Err(PredictionError::OutOfRange { index, value });
    }

    let sum: f64 = prediction.probabilities.iter().sum();
    if (sum - 1.0).abs() > tolerance {
        return Err(PredictionError::BadSum { sum });
    }

    let label_index = prediction
        .classes
        .iter()
        .position(|class| *class == prediction.prediction)
        .ok_or_else(|| PredictionError::UnknownLabel(prediction.prediction.clone()))?;

    let max = prediction
        .probabilities
        .iter()
        .copied()
        .fold(f64::MIN, f64::max);
    if (prediction.probability - max).abs() > tolerance {
        return Err(PredictionError::ProbabilityMismatch {
            reported: prediction.probability,
            max,
        });
    }
    if max - prediction.probabilities[label_index] > tolerance {
        return Err(PredictionError::NotMostLikely {
            label: prediction.prediction.clone(),
        });
    }

    Ok(())
}

fn in_unit_range(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}
