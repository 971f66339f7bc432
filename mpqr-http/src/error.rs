//! Error types for the HTTP dispatcher.

use http::StatusCode;

/// Errors that can occur while sending a request to the MercadoPago API.
///
/// `context` is the request line (e.g. `"POST /instore/orders/qr/..."`).
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// HTTP transport error (connection, TLS, timeout, invalid header, ...).
    #[error("HTTP error: {context}: {source}")]
    Http {
        /// Human-readable context.
        context: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The API answered with a non-2xx status.
    #[error("Unexpected HTTP status {status}: {context}: {body}")]
    HttpStatus {
        /// Human-readable context.
        context: String,
        /// The HTTP status code.
        status: StatusCode,
        /// The raw response body.
        body: String,
    },
    /// Failed to read the response body.
    #[error("Failed to read response body as text: {context}: {source}")]
    ResponseBodyRead {
        /// Human-readable context.
        context: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The response body is not valid JSON.
    #[error("Failed to deserialize JSON: {context}: {source}")]
    Decode {
        /// Human-readable context.
        context: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl DispatchError {
    /// Returns the HTTP status for [`DispatchError::HttpStatus`].
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body for [`DispatchError::HttpStatus`].
    #[must_use]
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::HttpStatus { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Parses the error response body as JSON, when there is one.
    ///
    /// MercadoPago reports failures as `{"message": ..., "error": ..., "status": ...}`.
    #[must_use]
    pub fn response_json(&self) -> Option<serde_json::Value> {
        self.response_body()
            .and_then(|body| serde_json::from_str(body).ok())
    }
}
