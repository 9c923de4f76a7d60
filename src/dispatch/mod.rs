//! Delivery of batch requests to the remote simulation service.
//!
//! [`BatchDispatcher`] is the seam; [`HttpDispatcher`] posts JSON with
//! `reqwest`, bounding each attempt with a timeout and retrying transport
//! failures and 5xx replies with exponential backoff.

pub mod types;

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;
use tracing::{info, warn};

pub use types::{BatchRequest, ConfigCombination, ModelUpload, UploadReply};

pub const UPLOAD_PATH: &str = "/model/upload";
pub const BATCH_PATH: &str = "/seq_model/simulate_batch";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    /// The service accepted the request but its reply could not be read.
    #[error("{url} accepted the request but its reply is unreadable: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("model upload rejected: {0}")]
    Rejected(String),
    #[error("cannot read model file {path}: {source}")]
    ModelFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("refusing to send an empty batch")]
    EmptyBatch,
}

impl DispatchError {
    /// Transport errors and server-side statuses are worth another attempt.
    ///
    /// A [`DispatchError::Decode`] is final: the service already ran the work.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_backoff.saturating_mul(factor)
    }

    /// Runs `op` until it succeeds, fails permanently, or attempts run out.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, DispatchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DispatchError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < attempts => {
                    let delay = self.backoff(attempt);
                    warn!(
                        %err,
                        attempt,
                        max_attempts = attempts,
                        delay_ms = delay.as_millis() as u64,
                        "{what} failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Sends a batch somewhere and returns the service's reply.
pub trait BatchDispatcher {
    fn dispatch(
        &self,
        request: &BatchRequest,
    ) -> impl Future<Output = Result<serde_json::Value, DispatchError>> + Send;
}

/// HTTP client for the simulation service.
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl HttpDispatcher {
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be constructed.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, DispatchError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| DispatchError::Transport {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self {
            client,
            base_url,
            retry,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_once<B: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<reqwest::Response, DispatchError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|source| DispatchError::Transport {
                url: url.to_string(),
                source,
            })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(DispatchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    async fn post_json<B, T>(&self, what: &str, path: &str, body: &B) -> Result<T, DispatchError>
    where
        B: serde::Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let url = self.url(path);
        let url = url.as_str();
        self.retry
            .run(what, || async move {
                let response = self.post_once(url, body).await?;
                response
                    .json::<T>()
                    .await
                    .map_err(|source| DispatchError::Decode {
                        url: url.to_string(),
                        source,
                    })
            })
            .await
    }

    /// Uploads model source text under `model_name`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Rejected`] unless the service reports the
    /// model as written.
    pub async fn upload_model(
        &self,
        model_name: &str,
        source: &[u8],
    ) -> Result<UploadReply, DispatchError> {
        let body = ModelUpload {
            model_name: model_name.to_string(),
            model_data: STANDARD.encode(source),
        };
        let reply: UploadReply = self.post_json("model upload", UPLOAD_PATH, &body).await?;
        if !reply.is_written() {
            return Err(DispatchError::Rejected(reply.status));
        }
        info!(model = model_name, "model uploaded");
        Ok(reply)
    }

    /// Reads a model file and uploads it under `model_name`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or the upload is rejected.
    pub async fn upload_model_file(
        &self,
        model_name: &str,
        path: &Path,
    ) -> Result<UploadReply, DispatchError> {
        let source = tokio::fs::read(path)
            .await
            .map_err(|source| DispatchError::ModelFile {
                path: path.display().to_string(),
                source,
            })?;
        self.upload_model(model_name, &source).await
    }
}

impl BatchDispatcher for HttpDispatcher {
    async fn dispatch(&self, request: &BatchRequest) -> Result<serde_json::Value, DispatchError> {
        if request.is_empty() {
            return Err(DispatchError::EmptyBatch);
        }
        info!(
            model = %request.model_name,
            combinations = request.len(),
            slots = request.number_of_slots,
            "dispatching batch"
        );
        self.post_json("batch dispatch", BATCH_PATH, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(4), Duration::from_millis(800));
    }

    #[test]
    fn only_server_side_statuses_retry() {
        let status = |code| DispatchError::Status {
            url: "u".into(),
            status: code,
            body: String::new(),
        };
        assert!(status(503).is_retryable());
        assert!(!status(400).is_retryable());
        assert!(!DispatchError::Rejected("x".into()).is_retryable());
    }

    #[tokio::test]
    async fn retry_gives_up_after_max_attempts() {
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(1),
        };
        let mut calls = 0;
        let result: Result<(), _> = policy
            .run("test", || {
                calls += 1;
                async {
                    Err(DispatchError::Status {
                        url: "u".into(),
                        status: 500,
                        body: String::new(),
                    })
                }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let policy = RetryPolicy::default();
        let mut calls = 0;
        let result: Result<(), _> = policy
            .run("test", || {
                calls += 1;
                async { Err(DispatchError::Rejected("no".into())) }
            })
            .await;
        assert!(matches!(result, Err(DispatchError::Rejected(_))));
        assert_eq!(calls, 1);
    }
}
