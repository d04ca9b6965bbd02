//! HTTP client for the scan endpoint.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::debug;

use super::types::{ApiError, ScanOutcome, ScanRequest, ScanResponse};

/// Default request timeout for scan submissions.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Trait for submitting scans.
///
/// This abstraction allows for dependency injection and easier testing by
/// enabling mock clients in tests. The boxed-future shape keeps it
/// object-safe.
pub trait ScanApi: Send + Sync {
    /// Submit one scan request and wait for its terminal outcome.
    fn submit(
        &self,
        request: ScanRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ScanOutcome, ApiError>> + Send + '_>>;
}

/// Real scan API client using reqwest.
pub struct HttpScanApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpScanApi {
    /// Creates a client with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn submit_inner(&self, request: ScanRequest) -> Result<ScanOutcome, ApiError> {
        let url = format!("{}/api/scan", self.base_url);
        debug!(%url, code = %request.code, track_id = ?request.track_id, "Submitting scan");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("Request failed: {}", e)))?;

        let status = response.status();

        // The server reports rejected scans as JSON with success=false, on
        // both 2xx and 4xx statuses. Only fall back to a bare status error
        // when there is no parseable body.
        match response.json::<ScanResponse>().await {
            Ok(body) => ScanOutcome::try_from(body),
            Err(_) if !status.is_success() => Err(ApiError::HttpStatus(status.as_u16())),
            Err(e) => Err(ApiError::UnexpectedResponse(e.to_string())),
        }
    }
}

impl ScanApi for HttpScanApi {
    fn submit(
        &self,
        request: ScanRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ScanOutcome, ApiError>> + Send + '_>> {
        Box::pin(self.submit_inner(request))
    }
}
