use std::cell::RefCell;
use std::rc::Rc;

use classifier_core::{
    probability_rows, status_view, AppStores, Message, Prediction, Unsubscribe,
};

use super::render::{chart_lines, status_line};

/// Line-oriented view over the application stores.
///
/// Observers only hold the view's own state, never the stores, so dropping
/// the stores frees the view's closures even without [`TerminalView::detach`].
pub struct TerminalView {
    subscriptions: Vec<Unsubscribe>,
}

struct StatusState {
    predicting: bool,
    message: Message,
    last_line: Option<String>,
}

impl TerminalView {
    /// Subscribes to every store. `emit` receives each rendered line.
    pub fn attach(stores: &AppStores, emit: impl Fn(&str) + 'static) -> Self {
        let emit: Rc<dyn Fn(&str)> = Rc::new(emit);
        let state = Rc::new(RefCell::new(StatusState {
            predicting: stores.predicting.get(),
            message: stores.message.get(),
            last_line: None,
        }));

        let refresh = {
            let emit = Rc::clone(&emit);
            Rc::new(move |state: &mut StatusState| {
                let line = status_line(&status_view(state.predicting, &state.message));
                if state.last_line != line {
                    if let Some(text) = &line {
                        emit(text.as_str());
                    }
                    state.last_line = line;
                }
            })
        };

        let (on_predicting, busy_state) = (Rc::clone(&refresh), Rc::clone(&state));
        let (on_message, message_state) = (refresh, state);
        let subscriptions = vec![
            stores.predicting.subscribe(move |busy: &bool| {
                let mut state = busy_state.borrow_mut();
                state.predicting = *busy;
                on_predicting(&mut *state);
            }),
            stores.message.subscribe(move |message: &Message| {
                let mut state = message_state.borrow_mut();
                state.message = message.clone();
                on_message(&mut *state);
            }),
            stores
                .prediction
                .subscribe(move |prediction: &Option<Prediction>| {
                    if let Some(prediction) = prediction {
                        for line in chart_lines(&probability_rows(prediction)) {
                            emit(line.as_str());
                        }
                    }
                }),
        ];

        Self { subscriptions }
    }

    pub fn detach(&self) {
        for subscription in &self.subscriptions {
            subscription.unsubscribe();
        }
    }
}
