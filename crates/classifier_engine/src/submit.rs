use classifier_core::{AppStores, Outcome, ValidationSettings, DEFAULT_FALLBACK_MESSAGE};
use classifier_logging::{classifier_info, classifier_warn, next_request_seq};

use crate::{PredictRequest, Predictor};

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitSettings {
    pub validation: ValidationSettings,
    /// Error text published when no usable response was obtained.
    pub fallback_message: String,
}

impl Default for SubmitSettings {
    fn default() -> Self {
        Self {
            validation: ValidationSettings::default(),
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
        }
    }
}

/// Drives one prediction round-trip through the stores.
///
/// `predicting` is true for the whole call and is reset on every exit path,
/// including when this future is dropped before completion. The message is
/// published before `predicting` goes back to false.
pub async fn submit(
    stores: &AppStores,
    predictor: &dyn Predictor,
    request: &PredictRequest,
    settings: &SubmitSettings,
) -> Outcome {
    let seq = next_request_seq();
    classifier_info!(
        "[req {}] submitting model={} input={}",
        seq,
        request.model,
        request.input.display()
    );

    stores.predicting.set(true);
    let predicting = stores.predicting.clone();
    let _reset = scopeguard::guard((), move |()| {
        predicting.set(false);
    });

    let outcome = match predictor.predict(request).await {
        Ok(response) => {
            Outcome::from_response(&response, &settings.validation, &settings.fallback_message)
        }
        Err(err) => {
            classifier_warn!("[req {}] prediction call failed: {}", seq, err);
            Outcome::from_failure(&settings.fallback_message)
        }
    };

    outcome.publish(stores);
    outcome
}
