//! Structured error types for flowctl-core.
//!
//! The library surfaces a small taxonomy (`Configuration`, `RemoteInvocation`,
//! `Transport`) plus response and upload failures. The `flowctl` binary wraps these
//! in `anyhow` for command-level context.

use std::path::PathBuf;
use thiserror::Error;

/// Broad classification of a transport failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// DNS failure, connection refused, TLS handshake failure
    Connect,
    /// Request did not complete within the transport's timeout
    Timeout,
    /// Any other failure while sending or reading the response
    Request,
}

/// Network-level failure reported by a [`crate::FlowTransport`]
#[derive(Error, Debug)]
#[error("{kind:?} failure for {url}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub url: String,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Request
        };
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();
        Self::new(kind, url, err.to_string())
    }
}

/// Main error type for flowctl-core operations
#[derive(Error, Debug)]
pub enum FlowError {
    /// Bad local input, detected before any network call
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    /// The remote service answered with a non-success status
    #[error("Flow invocation failed with status {status}: {body}")]
    RemoteInvocation { status: u16, body: String },

    /// The remote service could not be reached
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Success status but the body was not JSON
    #[error("Invalid response from {url}: {source}")]
    InvalidResponse {
        url: String,
        source: serde_json::Error,
    },

    /// File upload could not be completed
    #[error("Upload of {path:?} failed: {reason}")]
    Upload { path: PathBuf, reason: String },
}

/// Result type alias for flowctl-core operations
pub type Result<T> = std::result::Result<T, FlowError>;

impl FlowError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    pub fn remote(status: u16, body: impl Into<String>) -> Self {
        Self::RemoteInvocation {
            status,
            body: body.into(),
        }
    }

    pub fn invalid_response(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::InvalidResponse {
            url: url.into(),
            source,
        }
    }

    pub fn upload(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Upload {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Status code of a remote rejection, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteInvocation { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Max characters of a response body written to logs
pub const LOG_BODY_LIMIT: usize = 500;

/// Cap a response body for log lines; error values keep the full body.
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    if body.chars().count() > max_chars {
        let head: String = body.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FlowError::remote(500, "boom");
        assert_eq!(err.to_string(), "Flow invocation failed with status 500: boom");
        assert_eq!(err.status(), Some(500));

        let err = FlowError::configuration("Invalid tweaks JSON string");
        assert!(err.is_configuration());
        assert!(err.to_string().contains("Invalid tweaks"));
    }

    #[test]
    fn test_transport_error_conversion() {
        let transport = TransportError::new(
            TransportErrorKind::Timeout,
            "https://example.invalid/run",
            "deadline elapsed",
        );
        assert_eq!(transport.kind, TransportErrorKind::Timeout);

        let err: FlowError = transport.into();
        assert!(matches!(err, FlowError::Transport(_)));
        assert_eq!(err.status(), None);
    }


    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short", LOG_BODY_LIMIT), "short");
        let long = "x".repeat(600);
        let cut = truncate_body(&long, LOG_BODY_LIMIT);
        assert_eq!(cut.len(), 503);
        assert!(cut.ends_with("..."));
    }
}
