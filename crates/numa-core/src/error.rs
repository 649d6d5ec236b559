//! Update error taxonomy.
//!
//! Every failure inside a poll cycle maps to one of these variants. None of
//! them is fatal: the poller logs the error, returns to `Idle` and tries again
//! on the next tick.

use std::io;

/// Coarse classification of an [`UpdateError`], used for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Request failed or timed out.
    Network,
    /// Malformed or incomplete response body.
    Parse,
    /// Downloaded artifact did not match the advertised digest.
    ChecksumMismatch,
    /// Applying the artifact failed.
    Install,
    /// Local disk failure while writing or reading the artifact.
    Storage,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    /// Curl reported a transport error (connect, DNS, timeout, reset).
    #[error("network error: {0}")]
    Network(#[from] curl::Error),

    /// The server answered with a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    Http { url: String, status: u32 },

    /// The descriptor could not be understood.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("install failed: {0}")]
    Install(String),

    #[error("storage: {0}")]
    Storage(#[from] io::Error),
}

impl UpdateError {
    /// Classify the error.
    ///
    /// A bad status is a network problem when it happens on the artifact
    /// download; the descriptor fetch turns it into `Parse` before it gets here.
    pub fn kind(&self) -> ErrorKind {
        match self {
            UpdateError::Network(_) | UpdateError::Http { .. } => ErrorKind::Network,
            UpdateError::Parse(_) => ErrorKind::Parse,
            UpdateError::ChecksumMismatch { .. } => ErrorKind::ChecksumMismatch,
            UpdateError::Install(_) => ErrorKind::Install,
            UpdateError::Storage(_) => ErrorKind::Storage,
        }
    }

    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        UpdateError::Parse(msg.into())
    }

    pub(crate) fn install(msg: impl Into<String>) -> Self {
        UpdateError::Install(msg.into())
    }
}

pub type Result<T, E = UpdateError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_is_network_kind() {
        let e = UpdateError::Http {
            url: "https://numa.com/api/latest_numa_app".to_string(),
            status: 503,
        };
        assert_eq!(e.kind(), ErrorKind::Network);
        assert!(e.to_string().contains("HTTP 503"));
    }

    #[test]
    fn checksum_mismatch_message_names_both_digests() {
        let e = UpdateError::ChecksumMismatch {
            expected: "aa".to_string(),
            actual: "bb".to_string(),
        };
        assert_eq!(e.kind(), ErrorKind::ChecksumMismatch);
        assert_eq!(e.to_string(), "checksum mismatch: expected aa, got bb");
    }

    #[test]
    fn io_error_converts_to_storage() {
        let e: UpdateError = io::Error::new(io::ErrorKind::Other, "disk full").into();
        assert_eq!(e.kind(), ErrorKind::Storage);
    }
}
