//! Probe and curl error types.

use std::time::Duration;

use thiserror::Error;

/// A probe that produced no HTTP response at all.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("http handshake failed: {0}")]
    Handshake(#[source] hyper::Error),

    #[error("request failed: {0}")]
    Request(#[source] hyper::Error),

    #[error("failed reading response body: {0}")]
    Body(#[source] hyper::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// Outcome of a curl that did not end with a `200`.
#[derive(Debug, Error)]
pub enum CurlError {
    #[error("Endpoint: {url}, transport error: {source}")]
    Transport {
        url: String,
        #[source]
        source: ProbeError,
    },

    #[error("Endpoint: {url}, Status Code: {status}, Body: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("Endpoint: {url}, gave up after {attempts} attempts")]
    AttemptsExhausted { url: String, attempts: u32 },
}

impl CurlError {
    /// HTTP status carried by the error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            CurlError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_message_carries_url_status_and_body() {
        let err = CurlError::Status {
            url: "http://app.domain/x".to_string(),
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Endpoint: http://app.domain/x, Status Code: 500, Body: boom"
        );
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn transport_error_has_no_status() {
        let err = CurlError::Transport {
            url: "http://app.domain".to_string(),
            source: ProbeError::Timeout(Duration::from_secs(1)),
        };
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("timed out"));
    }
}
