use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use classifier_core::{Prediction, Response};
use classifier_logging::{classifier_debug, classifier_trace, request_seq};
use tokio::process::Command;

use crate::{FailureKind, PredictError, PredictRequest, Predictor};

#[derive(Debug, Clone)]
pub struct SidecarSettings {
    pub program: PathBuf,
    pub model_dir: PathBuf,
    pub env: Vec<(String, String)>,
    /// Kill the runner if it has not exited by then.
    pub timeout: Option<Duration>,
    /// The runner reports probabilities in percent (0-100). They are
    /// rescaled to 0-1 before the response leaves the predictor.
    pub percent_scale: bool,
}

/// Runs the model runner executable once per request.
///
/// The runner is invoked as `<program> -d <model_dir> -n <model> -i <input>`
/// and must print one JSON [`Response`] on stdout.
#[derive(Debug, Clone)]
pub struct SidecarPredictor {
    settings: SidecarSettings,
}

impl SidecarPredictor {
    pub fn new(settings: SidecarSettings) -> Self {
        Self { settings }
    }

    fn command(&self, request: &PredictRequest) -> Command {
        let mut command = Command::new(&self.settings.program);
        command
            .arg("-d")
            .arg(&self.settings.model_dir)
            .arg("-n")
            .arg(&request.model)
            .arg("-i")
            .arg(&request.input)
            .envs(self.settings.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait::async_trait]
impl Predictor for SidecarPredictor {
    async fn predict(&self, request: &PredictRequest) -> Result<Response, PredictError> {
        let program = self.settings.program.display().to_string();
        classifier_debug!(
            "[req {}] running {} model={} input={}",
            request_seq(),
            program,
            request.model,
            request.input.display()
        );

        let mut command = self.command(request);
        classifier_trace!("[req {}] argv: {:?}", request_seq(), command.as_std());
        let child = command
            .spawn()
            .map_err(|err| PredictError::new(FailureKind::Spawn, format!("{program}: {err}")))?;

        let output = match self.settings.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| {
                    PredictError::new(
                        FailureKind::Timeout,
                        format!("{program} did not finish within {limit:?}"),
                    )
                })?,
            None => child.wait_with_output().await,
        }
        .map_err(|err| PredictError::new(FailureKind::Spawn, format!("{program}: {err}")))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            classifier_debug!("[req {}] runner stderr: {}", request_seq(), stderr.trim());
        }

        if !output.status.success() {
            return Err(PredictError::new(
                FailureKind::Exit {
                    code: output.status.code(),
                },
                stderr.trim().to_string(),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut response: Response = serde_json::from_str(stdout.trim())
            .map_err(|err| PredictError::new(FailureKind::Decode, err.to_string()))?;
        if self.settings.percent_scale {
            if let Some(result) = response.result.as_mut() {
                rescale_percent(result);
            }
        }
        Ok(response)
    }
}

fn rescale_percent(prediction: &mut Prediction) {
    prediction.probability /= 100.0;
    for p in &mut prediction.probabilities {
        *p /= 100.0;
    }
}
