//! Types for the fetch layer.

use async_trait::async_trait;
use thiserror::Error;

/// Raw response handed back by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Full response body.
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Errors raised by a transport before a full response was obtained.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The per-URL deadline elapsed during the call.
    #[error("request timed out")]
    Timeout,

    /// Could not connect to the remote host.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request could not be built or sent.
    #[error("{0}")]
    Request(String),

    /// The status line arrived but the body could not be read.
    #[error("failed to read body: {0}")]
    Body(String),
}

/// A per-URL failure that aborts the whole batch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The remote answered with a non-2xx status.
    #[error("{url} Responded with status code - {status}")]
    Status { url: String, status: u16 },

    /// The request failed before a usable response arrived.
    #[error("{url} request failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },
}

impl FetchError {
    /// The URL that caused the failure.
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. } | Self::Transport { url, .. } => url,
        }
    }
}

/// Result of fetching a single URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 2xx response obtained within the timing window.
    Success(Vec<u8>),
    /// The deadline won the race; the URL is left out of the results.
    SkippedByDeadline,
    /// Non-2xx status or transport error.
    HardFailure(FetchError),
}

impl FetchOutcome {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::SkippedByDeadline => "skipped",
            Self::HardFailure(_) => "failed",
        }
    }
}

/// Trait for the network layer used by `PerItemFetcher`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Transport name for logging.
    fn name(&self) -> &str;

    /// Issue a GET for `url` and read the whole body.
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = FetchError::Status {
            url: "http://bad".to_string(),
            status: 500,
        };
        assert_eq!(err.to_string(), "http://bad Responded with status code - 500");
        assert_eq!(err.url(), "http://bad");
    }

    #[test]
    fn test_transport_error_message() {
        let err = FetchError::Transport {
            url: "http://down".to_string(),
            source: TransportError::Connect("connection refused".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "http://down request failed: connection failed: connection refused"
        );
    }

    #[test]
    fn test_is_success_range() {
        assert!(TransportResponse::new(200, "").is_success());
        assert!(TransportResponse::new(204, "").is_success());
        assert!(!TransportResponse::new(199, "").is_success());
        assert!(!TransportResponse::new(301, "").is_success());
        assert!(!TransportResponse::new(404, "").is_success());
    }

    #[test]
    fn test_outcome_kind() {
        assert_eq!(FetchOutcome::Success(vec![]).kind(), "success");
        assert_eq!(FetchOutcome::SkippedByDeadline.kind(), "skipped");
        let failure = FetchOutcome::HardFailure(FetchError::Status {
            url: "u".into(),
            status: 502,
        });
        assert_eq!(failure.kind(), "failed");
    }
}
