//! Logger setup for the `classifier` binary, driven by `--log`, `--log-file`
//! and `--verbose`.
//!
//! Lines from the HTTP stack are dropped so that prediction logs (tagged
//! `[req N]`) stay readable when the HTTP backend is in use.

use std::fs::File;
use std::path::Path;

use clap::ValueEnum;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

pub const DEFAULT_LOG_FILE: &str = "classifier.log";

/// Crates whose internals are noise next to prediction logs.
const QUIET_TARGETS: [&str; 4] = ["hyper", "h2", "rustls", "reqwest"];

/// Value of the `--log` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogDestination {
    /// Only the `--log-file` path. Keeps the terminal for the status line and chart.
    File,
    /// Only the terminal, interleaved with the status output.
    Terminal,
    /// Terminal and `--log-file`.
    Both,
}

impl LogDestination {
    fn wants_file(self) -> bool {
        matches!(self, LogDestination::File | LogDestination::Both)
    }

    fn wants_terminal(self) -> bool {
        matches!(self, LogDestination::Terminal | LogDestination::Both)
    }
}

/// `--verbose` adds the per-request debug lines (runner stderr, HTTP status).
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

pub fn initialize(destination: LogDestination, log_file: &Path, verbose: bool) {
    let level = level_for(verbose);
    let config = build_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if destination.wants_terminal() {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }
    if destination.wants_file() {
        match create_file_logger(log_file, level, config) {
            Ok(file_logger) => loggers.push(file_logger),
            Err(err) => eprintln!("Warning: could not create log file {log_file:?}: {err}"),
        }
    }
    if loggers.is_empty() {
        return;
    }

    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    let mut builder = ConfigBuilder::new();
    builder
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error);
    for target in QUIET_TARGETS {
        builder.add_filter_ignore_str(target);
    }
    builder.build()
}

fn create_file_logger(
    path: &Path,
    level: LevelFilter,
    config: Config,
) -> std::io::Result<Box<WriteLogger<File>>> {
    let file = File::create(path)?;
    Ok(WriteLogger::new(level, config, file))
}
