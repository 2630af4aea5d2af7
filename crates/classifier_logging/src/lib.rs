#![deny(missing_docs)]
//! Shared logging utilities for the classifier workspace.
//!
//! This crate provides the `classifier_*` logging macros used across the
//! codebase, a per-thread request sequence number for correlating log lines
//! of one prediction round-trip, and a minimal test initializer for the
//! global logger.

use std::cell::Cell;

thread_local! {
    /// Sequence number of the prediction request currently driven on this thread.
    static REQUEST_SEQ: Cell<u64> = const { Cell::new(0) };
}

/// Increments the request sequence number for the current thread and returns the new value.
pub fn next_request_seq() -> u64 {
    REQUEST_SEQ.with(|v| {
        let next = v.get().wrapping_add(1);
        v.set(next);
        next
    })
}

/// Retrieves the request sequence number for the current thread.
/// Returns 0 if no request has been issued yet.
pub fn request_seq() -> u64 {
    REQUEST_SEQ.with(|v| v.get())
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! classifier_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! classifier_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! classifier_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! classifier_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! classifier_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may have installed the logger already.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
