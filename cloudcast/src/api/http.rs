//! HTTP client abstraction for testability.

use std::future::Future;

use thiserror::Error;
use tracing::{debug, trace, warn};

/// Transport or status failure from an HTTP request.
///
/// The status code is carried when the server responded at all, so callers
/// can distinguish a 401 from a connection refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HttpError {
    /// HTTP status code, when a response was received.
    pub status: Option<u16>,
    /// Human-readable failure description.
    pub message: String,
}

impl HttpError {
    /// A failure with no HTTP response (connect error, timeout, bad body).
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// A non-2xx response.
    pub fn status(status: u16, url: &str) -> Self {
        Self {
            status: Some(status),
            message: format!("HTTP {} from {}", status, url),
        }
    }
}

/// Trait for asynchronous HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, HttpError>> + Send;

    /// Performs an async HTTP GET request with Bearer token authentication.
    fn get_with_bearer(
        &self,
        url: &str,
        bearer_token: &str,
    ) -> impl Future<Output = Result<Vec<u8>, HttpError>> + Send;

    /// Performs an async HTTP POST request with a JSON body.
    fn post_json(
        &self,
        url: &str,
        json_body: &str,
    ) -> impl Future<Output = Result<Vec<u8>, HttpError>> + Send;
}

/// Real HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a new client with default configuration (30s timeout).
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(30)
    }

    /// Creates a new client with a custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| HttpError::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn read_response(url: &str, response: reqwest::Response) -> Result<Vec<u8>, HttpError> {
        if !response.status().is_success() {
            warn!(
                url = url,
                status = response.status().as_u16(),
                "HTTP error status"
            );
            return Err(HttpError::status(response.status().as_u16(), url));
        }

        match response.bytes().await {
            Ok(bytes) => {
                trace!(url = url, bytes = bytes.len(), "HTTP response body read");
                Ok(bytes.to_vec())
            }
            Err(e) => {
                warn!(url = url, error = %e, "Failed to read response body");
                Err(HttpError::transport(format!(
                    "Failed to read response: {}",
                    e
                )))
            }
        }
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        trace!(url = url, "HTTP GET request starting");

        let response = match self.client.get(url).send().await {
            Ok(resp) => {
                debug!(
                    url = url,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(HttpError::transport(format!("Request failed: {}", e)));
            }
        };

        Self::read_response(url, response).await
    }

    async fn get_with_bearer(&self, url: &str, bearer_token: &str) -> Result<Vec<u8>, HttpError> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", bearer_token))
            .send()
            .await
            .map_err(|e| HttpError::transport(format!("Request failed: {}", e)))?;

        Self::read_response(url, response).await
    }

    async fn post_json(&self, url: &str, json_body: &str) -> Result<Vec<u8>, HttpError> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(json_body.to_string())
            .send()
            .await
            .map_err(|e| HttpError::transport(format!("POST request failed: {}", e)))?;

        Self::read_response(url, response).await
    }
}
