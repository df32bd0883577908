use thiserror::Error;

use super::types::ProblemDetails;

/// Errors produced by the ceremony protocol client.
///
/// Every variant maps one failure point of a single request/response round;
/// the client never retries, so the first failure is the one returned.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured base address plus the call path is not a usable URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The caller asked for a request the backend contract does not allow
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The request body could not be serialized
    #[error("Failed to encode request payload: {0}")]
    PayloadEncoding(String),

    /// The transport could not deliver the request or read the response
    #[error("Network request failed: {0}")]
    NetworkRequestFailed(String),

    /// The backend answered with a status code of 400 or above
    #[error("Request rejected with status {status}")]
    RequestRejected {
        status: u16,
        body: Option<ProblemDetails>,
    },

    /// The backend answered successfully but the body did not decode
    #[error("Malformed response: {0}")]
    ResponseMalformed(String),
}

/// Error reported by an [`HttpTransport`](super::HttpTransport) implementation.
#[derive(Debug, Error, Clone)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self(err.to_string())
    }
}
