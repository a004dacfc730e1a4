//! HTTP transport implementations

use crate::errors::HttpError;
use crate::types::{FormField, RawResponse};
use reqwest::Client;
use stampede_config::HttpConfig;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Transport capability consumed by the load engine.
///
/// Implementations must be safe for concurrent use: every virtual user
/// issues requests through the same shared transport.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// POST a form-encoded payload to a path relative to the target base URL
    async fn post_form(&self, path: &str, form: &[FormField]) -> Result<RawResponse, HttpError>;
}

/// Transport backed by a pooled reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the given target with specific configuration
    pub fn new(base_url: impl Into<String>, config: &HttpConfig) -> Result<Self, HttpError> {
        let base_url = base_url.into();
        reqwest::Url::parse(&base_url)
            .map_err(|e| HttpError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        debug!(
            "Creating HttpTransport for {} with {}s timeout",
            base_url,
            config.timeout.as_secs()
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .redirect(reqwest::redirect::Policy::limited(
                config.max_redirects as usize,
            ))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn post_form(&self, path: &str, form: &[FormField]) -> Result<RawResponse, HttpError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self.client.post(&url).form(form).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!("Response from {}: {} ({} bytes)", url, status, body.len());
        Ok(RawResponse { status, body })
    }
}

/// In-memory transport for offline runs and tests.
///
/// Responses are keyed by request path; unknown paths report a missing
/// mock, and paths registered as failing simulate a connection error.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, RawResponse>>,
    failing: Mutex<HashMap<String, String>>,
    calls: AtomicU64,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a canned response for a path
    pub fn with_response(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .expect("mock responses lock poisoned")
            .insert(path.to_string(), RawResponse::new(status, body));
        self
    }

    /// Register a path that fails at the transport level
    pub fn with_failure(self, path: &str, reason: &str) -> Self {
        self.failing
            .lock()
            .expect("mock failures lock poisoned")
            .insert(path.to_string(), reason.to_string());
        self
    }

    /// Total number of post_form calls observed
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn post_form(&self, path: &str, _form: &[FormField]) -> Result<RawResponse, HttpError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        if let Some(reason) = self
            .failing
            .lock()
            .expect("mock failures lock poisoned")
            .get(path)
        {
            return Err(HttpError::ConnectionFailed(reason.clone()));
        }

        match self
            .responses
            .lock()
            .expect("mock responses lock poisoned")
            .get(path)
        {
            Some(response) => Ok(response.clone()),
            None => {
                warn!("No mock response registered for {}", path);
                Err(HttpError::MissingMock(path.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_registered_response() {
        let mock = MockTransport::new().with_response("/login", 200, r#"{"token":"abc"}"#);

        let response = mock.post_form("/login", &[]).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"token":"abc"}"#);
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_simulates_transport_failure() {
        let mock = MockTransport::new().with_failure("/register", "connection refused");

        let err = mock.post_form("/register", &[]).await.unwrap_err();
        assert!(matches!(err, HttpError::ConnectionFailed(_)));
    }

    #[tokio::test]
    async fn test_mock_reports_missing_path() {
        let mock = MockTransport::new();
        let err = mock.post_form("/nowhere", &[]).await.unwrap_err();
        assert!(matches!(err, HttpError::MissingMock(_)));
    }

    #[test]
    fn test_transport_rejects_malformed_base_url() {
        let err = HttpTransport::new("not a url", &HttpConfig::default()).unwrap_err();
        assert!(matches!(err, HttpError::InvalidUrl(_)));
    }

    #[test]
    fn test_transport_strips_trailing_slash() {
        let transport =
            HttpTransport::new("http://localhost:5000/", &HttpConfig::default()).unwrap();
        assert_eq!(transport.base_url, "http://localhost:5000");
    }
}
