//! Inference error types.
//!
//! All errors implement `std::error::Error` via `thiserror`. Structured logging
//! is the caller's responsibility; these types carry the context needed to
//! build meaningful log entries.

use thiserror::Error;

/// Errors that can occur while calling the extraction model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InferenceError {
    /// TCP/HTTP connection to the model endpoint failed.
    #[error("connection failed to {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    /// The model endpoint did not answer within the deadline.
    #[error("inference timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Non-2xx HTTP response without an error envelope.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The service answered with an `error` object.
    #[error("{message}")]
    RemoteError { message: String },

    /// The response envelope lacks `choices[0].message.content` or is not JSON.
    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },

    /// Client construction failed.
    #[error("config error: {reason}")]
    ConfigError { reason: String },
}

impl InferenceError {
    /// Text suitable for an operator notice.
    ///
    /// For service-reported errors this is exactly the service's message.
    pub fn remote_message(&self) -> String {
        match self {
            InferenceError::RemoteError { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_displays_message_verbatim() {
        let err = InferenceError::RemoteError {
            message: "The API key is invalid".into(),
        };
        assert_eq!(err.to_string(), "The API key is invalid");
        assert_eq!(err.remote_message(), "The API key is invalid");
    }

    #[test]
    fn test_http_error_display() {
        let err = InferenceError::HttpError {
            status: 502,
            body: "bad gateway".into(),
        };
        assert_eq!(err.remote_message(), "HTTP 502: bad gateway");
    }
}
