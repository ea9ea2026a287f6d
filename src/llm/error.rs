//! Typed errors for gateway operations
//!
//! Structured variants let the send pipeline distinguish a missing
//! credential from a transient service failure without string matching.

use thiserror::Error;

/// Gateway failure taxonomy
///
/// - `MissingCredential` - no API key configured; surfaced on first call
/// - `Unauthorized` (401) - key rejected
/// - `RateLimited` (429) - quota exceeded; resend later
/// - `BadRequest` (400) - malformed request; caller error
/// - `ServiceError` (5xx) - server-side issue; resend may succeed
/// - `Network` - connection/timeout
/// - `EmptyResponse` - the service answered with no usable text
#[derive(Debug, Error)]
pub enum GatewayError {
    /// API key environment variable is not set
    #[error("No API key configured (set {0})")]
    MissingCredential(String),

    /// Credential rejected by the service (HTTP 401/403)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Malformed request (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Server-side error (HTTP 5xx)
    #[error("Service error: {0}")]
    ServiceError(String),

    /// Network connectivity issue (connection refused, timeout, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// The response carried no candidate text
    #[error("The service returned an empty response")]
    EmptyResponse,

    /// Other errors not fitting the above categories
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl GatewayError {
    /// Whether resending the same message is a reasonable recovery.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::RateLimited(_)
                | GatewayError::ServiceError(_)
                | GatewayError::Network(_)
                | GatewayError::EmptyResponse
        )
    }

    /// Convert HTTP status code and error body into a typed error
    pub fn from_http_status(status: reqwest::StatusCode, error_text: String) -> Self {
        match status.as_u16() {
            401 | 403 => GatewayError::Unauthorized(error_text),
            429 => GatewayError::RateLimited(error_text),
            400 => GatewayError::BadRequest(error_text),
            500..=599 => GatewayError::ServiceError(error_text),
            _ => GatewayError::Other(anyhow::anyhow!("HTTP {}: {}", status, error_text)),
        }
    }

    /// Convert transport-level reqwest errors into a typed error
    pub fn from_network_error(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::Network(format!("Request timeout: {}", e))
        } else if e.is_connect() {
            GatewayError::Network(format!("Connection failed: {}", e))
        } else if let Some(status) = e.status() {
            Self::from_http_status(status, e.to_string())
        } else {
            GatewayError::Other(e.into())
        }
    }
}
