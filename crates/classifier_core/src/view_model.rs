use crate::{Message, Prediction};

/// What the status area shows, derived from the `predicting` and `message` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusView {
    Idle,
    Busy,
    Notice { style: String, text: String },
}

pub fn status_view(predicting: bool, message: &Message) -> StatusView {
    if predicting {
        StatusView::Busy
    } else if message.is_blank() {
        StatusView::Idle
    } else {
        StatusView::Notice {
            style: message.style_name().to_string(),
            text: message.value.clone(),
        }
    }
}

/// One bar of the probability chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityRow {
    pub class: String,
    pub probability: f64,
    pub predicted: bool,
}

/// Chart rows, most likely class first. Ties keep the model's class order.
pub fn probability_rows(prediction: &Prediction) -> Vec<ProbabilityRow> {
    let mut rows: Vec<ProbabilityRow> = prediction
        .classes
        .iter()
        .zip(&prediction.probabilities)
        .map(|(class, &probability)| ProbabilityRow {
            class: class.clone(),
            probability,
            predicted: *class == prediction.prediction,
        })
        .collect();
    rows.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    rows
}
