// ── Core error types ──
//
// Errors surfaced by myheat-core. Consumers see domain failures here;
// the `From<myheat_api::Error>` impl folds transport and envelope failures
// into these variants while keeping the coarse kind and the vendor code.

use std::time::Duration;

use myheat_api::ErrorKind;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lifecycle ────────────────────────────────────────────────────
    /// The first refresh during setup failed; the host should retry later.
    #[error("Device not ready: {reason}")]
    NotReady { kind: ErrorKind, reason: String },

    /// The entry was unloaded; no further calls are made.
    #[error("Entry has been unloaded")]
    Unloaded,

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach MyHeat endpoint: {reason}")]
    ConnectionFailed { reason: String },

    #[error("MyHeat request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    // ── Vendor errors ────────────────────────────────────────────────
    /// Well-formed response with a non-zero `err` code.
    #[error("Request rejected by MyHeat (err={code})")]
    Rejected { code: i64, body: String },

    #[error("Unexpected response from MyHeat: {message}")]
    Decode { message: String },

    // ── Input errors ─────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Coarse failure kind, aligned with [`myheat_api::ErrorKind`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotReady { kind, .. } => *kind,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::ConnectionFailed { .. } => ErrorKind::Transport,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Rejected { .. } => ErrorKind::Rpc,
            _ => ErrorKind::Unknown,
        }
    }

    /// Vendor status code for rejected requests.
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            Self::Rejected { code, .. } => Some(*code),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<myheat_api::Error> for CoreError {
    fn from(err: myheat_api::Error) -> Self {
        match err {
            myheat_api::Error::Timeout { timeout } => CoreError::Timeout { timeout },
            myheat_api::Error::Transport(ref e) => CoreError::ConnectionFailed {
                reason: e.to_string(),
            },
            myheat_api::Error::HttpStatus { status, .. } => CoreError::ConnectionFailed {
                reason: format!("HTTP {status}"),
            },
            myheat_api::Error::InvalidUrl(e) => CoreError::ValidationFailed {
                message: format!("invalid endpoint URL: {e}"),
            },
            myheat_api::Error::Tls(message) => CoreError::ConnectionFailed { reason: message },
            myheat_api::Error::Decode { message, .. } => CoreError::Decode { message },
            myheat_api::Error::Rpc { code, body } => CoreError::Rejected { code, body },
            myheat_api::Error::Unknown(message) => CoreError::Internal(message),
        }
    }
}
