use std::time::Duration;

use strum::{Display, IntoStaticStr};
use thiserror::Error;

/// Top-level error type for the `myheat-api` crate.
///
/// Every RPC call funnels its failures into one of these variants.
/// `myheat-core` maps them into coordinator outcomes and user-facing
/// diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// The request exceeded its time budget (or was cancelled by it).
    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// HTTP transport error (connection refused, DNS failure, reset socket, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success HTTP status.
    #[error("HTTP {status} from RPC endpoint")]
    HttpStatus { status: u16, body: String },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// Response body was not JSON, or did not match the expected shape.
    #[error("Decode error: {message}")]
    Decode { message: String, body: String },

    // ── RPC ─────────────────────────────────────────────────────────
    /// Well-formed envelope with a non-zero `err` code.
    #[error("RPC error code {code}")]
    Rpc { code: i64, body: String },

    /// Anything that does not fit the categories above.
    #[error("Unexpected error: {0}")]
    Unknown(String),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Timeout,
    Transport,
    Decode,
    Rpc,
    Unknown,
}

impl Error {
    /// Classify a `reqwest` failure, promoting its own timeouts to [`Error::Timeout`].
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout }
        } else if err.is_decode() {
            Self::Decode {
                message: err.to_string(),
                body: String::new(),
            }
        } else {
            Self::Transport(err)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Transport(_) | Self::HttpStatus { .. } | Self::InvalidUrl(_) | Self::Tls(_) => {
                ErrorKind::Transport
            }
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Rpc { .. } => ErrorKind::Rpc,
            Self::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// The vendor status code, if this is an RPC rejection.
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            Self::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// The raw response body captured with the error, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Rpc { body, .. } | Self::Decode { body, .. } | Self::HttpStatus { body, .. } => {
                Some(body.as_str())
            }
            _ => None,
        }
    }

    /// Returns `true` if this is a transient error worth retrying later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_error_exposes_code_and_body() {
        let err = Error::Rpc {
            code: 5,
            body: r#"{"err":5}"#.into(),
        };
        assert_eq!(err.rpc_code(), Some(5));
        assert_eq!(err.body(), Some(r#"{"err":5}"#));
        assert_eq!(err.kind(), ErrorKind::Rpc);
        assert!(!err.is_transient());
    }

    #[test]
    fn sub_second_timeouts_keep_their_budget() {
        let err = Error::Timeout {
            timeout: Duration::from_millis(500),
        };
        assert_eq!(err.to_string(), "Request timed out after 500ms");
        let err = Error::Timeout {
            timeout: Duration::from_secs(10),
        };
        assert_eq!(err.to_string(), "Request timed out after 10s");
    }

    #[test]
    fn kinds_render_snake_case() {
        assert_eq!(ErrorKind::Timeout.to_string(), "timeout");
        let name: &'static str = ErrorKind::Decode.into();
        assert_eq!(name, "decode");
    }

    #[test]
    fn timeouts_and_server_errors_are_transient() {
        assert!(
            Error::Timeout {
                timeout: Duration::from_secs(10)
            }
            .is_transient()
        );
        assert!(
            Error::HttpStatus {
                status: 502,
                body: String::new()
            }
            .is_transient()
        );
        assert!(
            !Error::HttpStatus {
                status: 404,
                body: String::new()
            }
            .is_transient()
        );
        assert_eq!(
            Error::HttpStatus {
                status: 404,
                body: String::new()
            }
            .kind(),
            ErrorKind::Transport
        );
    }
}
