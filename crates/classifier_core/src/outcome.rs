use classifier_logging::{classifier_info, classifier_warn, request_seq};

use crate::{validate_response, AppStores, Message, Prediction, Response, ValidationSettings};

/// Text published when no usable response was obtained.
pub const DEFAULT_FALLBACK_MESSAGE: &str = "Prediction failed. Please try again.";

/// What a settled prediction call publishes into the stores.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub message: Message,
    /// Only ever a prediction that passed validation.
    pub prediction: Option<Prediction>,
}

impl Outcome {
    /// Maps a received response. Contract violations and inconsistent results
    /// collapse into the generic `fallback` error.
    pub fn from_response(
        response: &Response,
        settings: &ValidationSettings,
        fallback: &str,
    ) -> Self {
        match validate_response(response, settings) {
            Ok(prediction) => {
                classifier_info!(
                    "[req {}] model={} predicted {} ({:.3})",
                    request_seq(),
                    prediction.model,
                    prediction.prediction,
                    prediction.probability
                );
                Self {
                    message: success_message(response, prediction),
                    prediction: Some(prediction.clone()),
                }
            }
            Err(err) if err.is_contract_violation() => {
                classifier_warn!("[req {}] rejected response: {}", request_seq(), err);
                Self::from_failure(fallback)
            }
            Err(_) => {
                classifier_info!(
                    "[req {}] service failure: {}",
                    request_seq(),
                    response.message
                );
                Self {
                    message: Message::error(response.message.clone()),
                    prediction: None,
                }
            }
        }
    }

    /// Maps a call that produced no response at all.
    pub fn from_failure(fallback: &str) -> Self {
        Self {
            message: Message::error(fallback),
            prediction: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.prediction.is_some()
    }

    /// Publishes the message first, then the prediction. A failed outcome
    /// clears any earlier prediction.
    pub fn publish(&self, stores: &AppStores) {
        stores.message.set(self.message.clone());
        stores.prediction.set(self.prediction.clone());
    }
}

fn success_message(response: &Response, prediction: &Prediction) -> Message {
    if response.message.is_empty() {
        Message::success(format!(
            "Predicted: {} ({:.1}%)",
            prediction.prediction,
            prediction.probability * 100.0
        ))
    } else {
        Message::success(response.message.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_message_prefers_service_text() {
        let prediction = Prediction {
            model: "VGG16".into(),
            prediction: "DME".into(),
            probability: 1.0,
            classes: vec!["DME".into()],
            probabilities: vec![1.0],
        };
        let response = Response::success(prediction.clone(), "Predicted: DME");
        assert_eq!(
            success_message(&response, &prediction).value,
            "Predicted: DME"
        );

        let silent = Response::success(prediction.clone(), "");
        assert_eq!(
            success_message(&silent, &prediction).value,
            "Predicted: DME (100.0%)"
        );
    }
}
