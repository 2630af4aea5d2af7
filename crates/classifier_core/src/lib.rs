//! Classifier core: observable cells, prediction schema and the pure mapping
//! from a settled prediction call to what the views render.
mod cell;
mod outcome;
mod schema;
mod stores;
mod validate;
mod view_model;

pub use cell::{Notified, ObservableCell, Unsubscribe};
pub use outcome::{Outcome, DEFAULT_FALLBACK_MESSAGE};
pub use schema::{Message, Prediction, Response, STYLE_ERROR, STYLE_INFO, STYLE_SUCCESS};
pub use stores::AppStores;
pub use validate::{
    validate_prediction, validate_response, PredictionError, ResponseError, ValidationSettings,
    DEFAULT_SUM_TOLERANCE,
};
pub use view_model::{probability_rows, status_view, ProbabilityRow, StatusView};
