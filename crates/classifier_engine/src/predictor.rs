use std::time::Duration;

use classifier_core::Response;
use classifier_logging::{classifier_debug, request_seq};
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::{FailureKind, PredictError, PredictRequest};

/// The external prediction service.
#[async_trait::async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, request: &PredictRequest) -> Result<Response, PredictError>;
}

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl HttpSettings {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            max_bytes: 1024 * 1024,
        }
    }
}

/// Posts the request as JSON and decodes the body as a [`Response`].
#[derive(Debug, Clone)]
pub struct HttpPredictor {
    settings: HttpSettings,
    client: reqwest::Client,
}

impl HttpPredictor {
    pub fn new(settings: HttpSettings) -> Result<Self, PredictError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| PredictError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }
}

#[async_trait::async_trait]
impl Predictor for HttpPredictor {
    async fn predict(&self, request: &PredictRequest) -> Result<Response, PredictError> {
        let url = reqwest::Url::parse(&self.settings.endpoint)
            .map_err(|err| PredictError::new(FailureKind::InvalidRequest, err.to_string()))?;
        let body = serde_json::to_vec(request)
            .map_err(|err| PredictError::new(FailureKind::InvalidRequest, err.to_string()))?;

        classifier_debug!(
            "[req {}] POST {} model={}",
            request_seq(),
            url,
            request.model
        );

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PredictError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(PredictError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(PredictError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&bytes)
            .map_err(|err| PredictError::new(FailureKind::Decode, err.to_string()))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> PredictError {
    if err.is_timeout() {
        return PredictError::new(FailureKind::Timeout, err.to_string());
    }
    PredictError::new(FailureKind::Network, err.to_string())
}
