#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use classifier_core::{validate_response, AppStores, ValidationSettings};
use classifier_engine::{
    submit, FailureKind, PredictRequest, Predictor, SidecarPredictor, SidecarSettings,
    SubmitSettings,
};
use tempfile::TempDir;

fn write_runner(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("runner.sh");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn settings(program: PathBuf) -> SidecarSettings {
    SidecarSettings {
        program,
        model_dir: PathBuf::from("/opt/models"),
        env: vec![("TF_CPP_MIN_LOG_LEVEL".to_string(), "3".to_string())],
        timeout: Some(Duration::from_secs(10)),
        percent_scale: false,
    }
}

#[tokio::test]
async fn passes_flags_and_env_and_parses_stdout() {
    let temp = TempDir::new().unwrap();
    let runner = write_runner(
        temp.path(),
        r#"printf '{"success":false,"result":null,"message":"%s %s %s %s %s %s log=%s"}' "$1" "$2" "$3" "$4" "$5" "$6" "$TF_CPP_MIN_LOG_LEVEL""#,
    );

    let response = SidecarPredictor::new(settings(runner))
        .predict(&PredictRequest::new("CUSTOM", "eye.png"))
        .await
        .expect("runner ok");

    assert!(!response.success);
    assert_eq!(
        response.message,
        "-d /opt/models -n CUSTOM -i eye.png log=3"
    );
}

#[tokio::test]
async fn successful_prediction_round_trips() {
    let temp = TempDir::new().unwrap();
    let runner = write_runner(
        temp.path(),
        r#"echo '{"success":true,"result":{"model":"VGG16","prediction":"NORMAL","probability":0.8,"classes":["DR","NORMAL"],"probabilities":[0.2,0.8]},"message":"Predicted: NORMAL"}'
echo 'loading graph' >&2"#,
    );

    let response = SidecarPredictor::new(settings(runner))
        .predict(&PredictRequest::new("VGG16", "eye.png"))
        .await
        .expect("runner ok");

    assert!(response.success);
    assert_eq!(response.result.unwrap().prediction, "NORMAL");
}

#[tokio::test]
async fn nonzero_exit_is_a_call_failure() {
    let temp = TempDir::new().unwrap();
    let runner = write_runner(temp.path(), "echo 'segfault-ish' >&2\nexit 3");

    let err = SidecarPredictor::new(settings(runner))
        .predict(&PredictRequest::new("VGG16", "eye.png"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::Exit { code: Some(3) });
    assert_eq!(err.message, "segfault-ish");
}

#[tokio::test]
async fn non_json_stdout_is_a_decode_failure() {
    let temp = TempDir::new().unwrap();
    let runner = write_runner(temp.path(), "echo 'Predicted class: 4'");

    let err = SidecarPredictor::new(settings(runner))
        .predict(&PredictRequest::new("VGG16", "eye.png"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn missing_program_is_a_spawn_failure() {
    let temp = TempDir::new().unwrap();
    let err = SidecarPredictor::new(settings(temp.path().join("does-not-exist")))
        .predict(&PredictRequest::new("VGG16", "eye.png"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Spawn);
}

#[tokio::test]
async fn slow_runner_times_out() {
    let temp = TempDir::new().unwrap();
    let runner = write_runner(temp.path(), "sleep 5");
    let settings = SidecarSettings {
        timeout: Some(Duration::from_millis(100)),
        ..settings(runner)
    };

    let err = SidecarPredictor::new(settings)
        .predict(&PredictRequest::new("VGG16", "eye.png"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

const PERCENT_RUNNER: &str = r#"echo '{"success":true,"result":{"model":"VGG16","prediction":"DME","probability":90.0,"classes":["CNV","DME"],"probabilities":[10.0,90.0]},"message":"Predicted: DME"}'"#;

#[tokio::test]
async fn percent_output_is_rescaled_to_fractions() {
    let temp = TempDir::new().unwrap();
    let runner = write_runner(temp.path(), PERCENT_RUNNER);
    let settings = SidecarSettings {
        percent_scale: true,
        ..settings(runner)
    };

    let response = SidecarPredictor::new(settings)
        .predict(&PredictRequest::new("VGG16", "eye.png"))
        .await
        .expect("runner ok");

    let prediction = validate_response(&response, &ValidationSettings::default())
        .expect("rescaled result is a valid distribution");
    assert!((prediction.probability - 0.9).abs() < 1e-12);
    assert_eq!(prediction.probabilities.len(), 2);
    assert!((prediction.probabilities[0] - 0.1).abs() < 1e-12);
    assert!((prediction.probabilities[1] - 0.9).abs() < 1e-12);
}

#[tokio::test]
async fn percent_output_without_rescaling_is_rejected() {
    let temp = TempDir::new().unwrap();
    let runner = write_runner(temp.path(), PERCENT_RUNNER);
    let predictor = SidecarPredictor::new(settings(runner));
    let stores = AppStores::new();
    let request = PredictRequest::new("VGG16", "eye.png");
    let submit_settings = SubmitSettings::default();

    let outcome = submit(&stores, &predictor, &request, &submit_settings).await;

    assert!(!outcome.is_success());
    assert_eq!(stores.prediction.get(), None);
}

#[tokio::test]
async fn rescaled_percent_output_publishes_prediction() {
    let temp = TempDir::new().unwrap();
    let runner = write_runner(temp.path(), PERCENT_RUNNER);
    let predictor = SidecarPredictor::new(SidecarSettings {
        percent_scale: true,
        ..settings(runner)
    });
    let stores = AppStores::new();
    let request = PredictRequest::new("VGG16", "eye.png");
    let submit_settings = SubmitSettings::default();

    let outcome = submit(&stores, &predictor, &request, &submit_settings).await;

    assert!(outcome.is_success());
    assert_eq!(stores.message.get().value, "Predicted: DME");
    assert!(!stores.predicting.get());
}
