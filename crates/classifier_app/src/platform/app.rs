use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use classifier_core::AppStores;
use classifier_engine::{submit, PredictRequest};
use classifier_logging::{classifier_error, classifier_info};

use super::args::Args;
use super::config::AppConfig;
use super::logging;
use super::ui::view::TerminalView;

pub fn run_app() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    logging::initialize(args.log, &args.log_file, args.verbose);

    let config = AppConfig::load(&args.config)?;

    if args.list_models {
        for model in &config.models {
            println!("{model}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let (Some(model), Some(input)) = (args.model, args.input) else {
        bail!("both --model and --input are required");
    };
    if !config.knows_model(&model) {
        bail!(
            "unknown model {model:?}; configured models: {}",
            config.models.join(", ")
        );
    }

    let predictor = config
        .predictor()
        .context("failed to set up the prediction backend")?;
    let settings = config.submit_settings();
    let request = PredictRequest::new(model, input);

    let stores = AppStores::new();
    let view = TerminalView::attach(&stores, |line| println!("{line}"));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let outcome = runtime.block_on(submit(&stores, predictor.as_ref(), &request, &settings));
    view.detach();

    if outcome.is_success() {
        classifier_info!("Prediction finished: {}", outcome.message.value);
        Ok(ExitCode::SUCCESS)
    } else {
        classifier_error!("Prediction failed: {}", outcome.message.value);
        Ok(ExitCode::FAILURE)
    }
}
