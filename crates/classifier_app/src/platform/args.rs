use std::path::PathBuf;

use clap::Parser;

use super::logging::{LogDestination, DEFAULT_LOG_FILE};

/// Classify an image with one of the configured models.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// RON configuration file. Defaults are used when it does not exist.
    #[arg(short, long, default_value = "classifier.ron")]
    pub config: PathBuf,

    /// Model name, one of the configured models.
    #[arg(short, long, required_unless_present = "list_models")]
    pub model: Option<String>,

    /// Input image to classify.
    #[arg(short, long, required_unless_present = "list_models")]
    pub input: Option<PathBuf>,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,

    /// Log file used when `--log` is `file` or `both`.
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Include per-request debug lines in the log.
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the configured model names and exit.
    #[arg(long)]
    pub list_models: bool,
}
