use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use classifier_core::{ValidationSettings, DEFAULT_FALLBACK_MESSAGE, DEFAULT_SUM_TOLERANCE};
use classifier_engine::{
    HttpPredictor, HttpSettings, PredictError, Predictor, SidecarPredictor, SidecarSettings,
    SubmitSettings,
};
use classifier_logging::classifier_info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BackendConfig {
    Http {
        endpoint: String,
        #[serde(default = "default_connect_timeout_ms")]
        connect_timeout_ms: u64,
        #[serde(default = "default_request_timeout_ms")]
        request_timeout_ms: u64,
        #[serde(default = "default_max_bytes")]
        max_bytes: u64,
    },
    Sidecar {
        program: PathBuf,
        model_dir: PathBuf,
        #[serde(default)]
        env: Vec<(String, String)>,
        #[serde(default)]
        timeout_ms: Option<u64>,
        /// `oct-tf` prints probabilities in percent.
        #[serde(default = "default_percent_scale")]
        percent_scale: bool,
    },
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_request_timeout_ms() -> u64 {
    60_000
}

fn default_max_bytes() -> u64 {
    1024 * 1024
}

fn default_percent_scale() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub models: Vec<String>,
    pub fallback_message: String,
    pub sum_tolerance: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::Sidecar {
                program: PathBuf::from("oct-tf"),
                model_dir: PathBuf::from("models"),
                env: vec![("TF_CPP_MIN_LOG_LEVEL".to_string(), "3".to_string())],
                timeout_ms: None,
                percent_scale: true,
            },
            models: vec!["VGG16".to_string(), "CUSTOM".to_string()],
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
            sum_tolerance: DEFAULT_SUM_TOLERANCE,
        }
    }
}

impl AppConfig {
    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                classifier_info!("No config at {:?}; using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: AppConfig = ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.check()?;
        classifier_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.models.is_empty() {
            return Err(ConfigError::Invalid("no models configured".into()));
        }
        if !(self.sum_tolerance > 0.0 && self.sum_tolerance < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "sum_tolerance must be in (0, 1), got {}",
                self.sum_tolerance
            )));
        }
        Ok(())
    }

    pub fn knows_model(&self, name: &str) -> bool {
        self.models.iter().any(|model| model == name)
    }

    pub fn submit_settings(&self) -> SubmitSettings {
        SubmitSettings {
            validation: ValidationSettings {
                sum_tolerance: self.sum_tolerance,
            },
            fallback_message: self.fallback_message.clone(),
        }
    }

    pub fn predictor(&self) -> Result<Box<dyn Predictor>, PredictError> {
        match &self.backend {
            BackendConfig::Http {
                endpoint,
                connect_timeout_ms,
                request_timeout_ms,
                max_bytes,
            } => {
                let settings = HttpSettings {
                    endpoint: endpoint.clone(),
                    connect_timeout: Duration::from_millis(*connect_timeout_ms),
                    request_timeout: Duration::from_millis(*request_timeout_ms),
                    max_bytes: *max_bytes,
                };
                Ok(Box::new(HttpPredictor::new(settings)?))
            }
            BackendConfig::Sidecar {
                program,
                model_dir,
                env,
                timeout_ms,
                percent_scale,
            } => Ok(Box::new(SidecarPredictor::new(SidecarSettings {
                program: program.clone(),
                model_dir: model_dir.clone(),
                env: env.clone(),
                timeout: timeout_ms.map(Duration::from_millis),
                percent_scale: *percent_scale,
            }))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::load(&temp.path().join("absent.ron")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.knows_model("VGG16"));
        assert!(!config.knows_model("vgg16"));
    }

    #[test]
    fn http_backend_fills_in_timeouts() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("classifier.ron");
        fs::write(
            &path,
            r#"(
                backend: Http(endpoint: "http://127.0.0.1:8080/predict"),
                models: ["VGG16"],
                fallback_message: "Service unreachable",
            )"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(
            config.backend,
            BackendConfig::Http {
                endpoint: "http://127.0.0.1:8080/predict".to_string(),
                connect_timeout_ms: 10_000,
                request_timeout_ms: 60_000,
                max_bytes: 1024 * 1024,
            }
        );
        assert_eq!(config.sum_tolerance, DEFAULT_SUM_TOLERANCE);
        assert_eq!(
            config.submit_settings().fallback_message,
            "Service unreachable"
        );
        assert!(config.predictor().is_ok());
    }

    #[test]
    fn sidecar_backend_round_trips_env() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("classifier.ron");
        fs::write(
            &path,
            r#"(
                backend: Sidecar(
                    program: "bin/oct-tf",
                    model_dir: "resources/models",
                    env: [("TF_CPP_MIN_LOG_LEVEL", "3")],
                    timeout_ms: Some(30000),
                ),
            )"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        match config.backend {
            BackendConfig::Sidecar {
                env,
                timeout_ms,
                percent_scale,
                ..
            } => {
                assert_eq!(env, vec![("TF_CPP_MIN_LOG_LEVEL".into(), "3".into())]);
                assert_eq!(timeout_ms, Some(30000));
                assert!(percent_scale, "oct-tf output is in percent unless told otherwise");
            }
            other => panic!("unexpected backend {other:?}"),
        }
        assert_eq!(config.models, AppConfig::default().models);
    }

    #[test]
    fn shipped_example_parses() {
        let config: AppConfig = ron::from_str(include_str!("../../classifier.example.ron")).unwrap();
        config.check().unwrap();
        assert_eq!(config.models, vec!["VGG16", "CUSTOM"]);
        assert!(matches!(
            config.backend,
            BackendConfig::Sidecar {
                percent_scale: true,
                ..
            }
        ));
    }

    #[test]
    fn fractional_runner_can_opt_out_of_percent_scale() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("classifier.ron");
        fs::write(
            &path,
            r#"(
                backend: Sidecar(
                    program: "bin/runner",
                    model_dir: "models",
                    percent_scale: false,
                ),
            )"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert!(matches!(
            config.backend,
            BackendConfig::Sidecar {
                percent_scale: false,
                ..
            }
        ));
        assert!(config.predictor().is_ok());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("classifier.ron");
        fs::write(&path, "(backend: Carrier pigeon)").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn empty_model_list_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("classifier.ron");
        fs::write(&path, "(models: [])").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));
    }
}
