use crate::{Message, ObservableCell, Prediction};

/// The application's shared cells.
///
/// Built once by the application and handed by reference to every view and
/// to the submission flow. Cloning yields handles onto the same cells.
#[derive(Debug, Clone)]
pub struct AppStores {
    /// Latest status notification.
    pub message: ObservableCell<Message>,
    /// True while a prediction request is in flight.
    pub predicting: ObservableCell<bool>,
    /// Last prediction that passed validation; `None` until one arrives or after a failure.
    pub prediction: ObservableCell<Option<Prediction>>,
}

impl AppStores {
    pub fn new() -> Self {
        Self {
            message: ObservableCell::new(Message::empty()),
            predicting: ObservableCell::new(false),
            prediction: ObservableCell::new(None),
        }
    }
}

impl Default for AppStores {
    fn default() -> Self {
        Self::new()
    }
}
