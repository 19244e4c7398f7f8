//! Error types shared by the quote pipeline

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),

    #[error("Failed to parse JSON response: {0}")]
    Decode(String),

    #[error("No answer within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store write did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Store write failed: {0}")]
    Write(String),
}

impl From<fjall::Error> for StoreError {
    fn from(e: fjall::Error) -> Self {
        Self::Write(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Write(e.to_string())
    }
}

/// Everything that can stop a `/cotacao` request from answering with a bid.
#[derive(Debug, Error)]
pub enum CotacaoError {
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("upstream timed out after {0:?}")]
    UpstreamTimeout(Duration),

    #[error("malformed upstream payload: {0}")]
    UpstreamMalformedPayload(String),

    #[error("store timed out after {0:?}")]
    StoreTimeout(Duration),

    #[error("store write failed: {0}")]
    StoreWriteFailure(String),

    #[error("snapshot write failed: {0}")]
    SnapshotWriteFailure(String),

    #[error("request deadline of {0:?} exceeded")]
    OuterDeadlineExceeded(Duration),
}

impl CotacaoError {
    /// Stable machine-readable name of the failure kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UpstreamUnreachable(_) => "upstream_unreachable",
            Self::UpstreamTimeout(_) => "upstream_timeout",
            Self::UpstreamMalformedPayload(_) => "upstream_malformed_payload",
            Self::StoreTimeout(_) => "store_timeout",
            Self::StoreWriteFailure(_) => "store_write_failure",
            Self::SnapshotWriteFailure(_) => "snapshot_write_failure",
            Self::OuterDeadlineExceeded(_) => "outer_deadline_exceeded",
        }
    }
}

impl From<UpstreamError> for CotacaoError {
    fn from(e: UpstreamError) -> Self {
        match e {
            UpstreamError::Timeout(budget) => Self::UpstreamTimeout(budget),
            UpstreamError::Decode(_) => Self::UpstreamMalformedPayload(e.to_string()),
            UpstreamError::Transport(_) | UpstreamError::Status(_) => {
                Self::UpstreamUnreachable(e.to_string())
            }
        }
    }
}

impl From<StoreError> for CotacaoError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Timeout(budget) => Self::StoreTimeout(budget),
            StoreError::Write(msg) => Self::StoreWriteFailure(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_errors_map_to_kinds() {
        let timeout: CotacaoError = UpstreamError::Timeout(Duration::from_millis(200)).into();
        assert_eq!(timeout.code(), "upstream_timeout");

        let status: CotacaoError =
            UpstreamError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE).into();
        assert_eq!(status.code(), "upstream_unreachable");
        assert_eq!(
            status.to_string(),
            "upstream unreachable: HTTP error: 503 Service Unavailable"
        );

        let decode: CotacaoError = UpstreamError::Decode("expected value".to_string()).into();
        assert_eq!(decode.code(), "upstream_malformed_payload");
    }

    #[test]
    fn test_store_errors_map_to_kinds() {
        let timeout: CotacaoError = StoreError::Timeout(Duration::from_millis(10)).into();
        assert_eq!(timeout.code(), "store_timeout");

        let write: CotacaoError = StoreError::Write("disk full".to_string()).into();
        assert_eq!(write.code(), "store_write_failure");
        assert_eq!(write.to_string(), "store write failed: disk full");
    }
}
