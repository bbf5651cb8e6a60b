//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use myheat_api::ErrorKind;
use myheat_config::ConfigError;
use myheat_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the MyHeat endpoint: {reason}")]
    #[diagnostic(
        code(myheat::connection_failed),
        help(
            "Check network access to my.myheat.net, or the endpoint configured\n\
             in your profile. Run with -vv to see each request."
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out after {timeout:?}")]
    #[diagnostic(
        code(myheat::timeout),
        help("Increase the budget with --timeout or the profile's `timeout` key.")
    )]
    Timeout { timeout: Duration },

    #[error("Device not ready: {reason}")]
    #[diagnostic(
        code(myheat::not_ready),
        help("The device state could not be fetched ({kind}). Try again later.")
    )]
    NotReady { kind: ErrorKind, reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("MyHeat rejected the request (err={code})")]
    #[diagnostic(
        code(myheat::rejected),
        help(
            "Verify the username, API key and device id of your profile.\n\
             Run: myheat devices"
        )
    )]
    Rejected { code: i64 },

    #[error("No devices are visible to '{username}'")]
    #[diagnostic(
        code(myheat::auth_failed),
        help(
            "MyHeat accepted the request but returned no devices, which usually\n\
             means the username or API key is wrong."
        )
    )]
    AuthFailed { username: String },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(myheat::no_credentials),
        help(
            "Store one with: myheat config set-key {profile}\n\
             Or set the MYHEAT_API_KEY environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Responses ────────────────────────────────────────────────────

    #[error("Unexpected response: {message}")]
    #[diagnostic(code(myheat::unexpected))]
    Unexpected { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(myheat::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found")]
    #[diagnostic(
        code(myheat::profile_not_found),
        help("Available profiles: {available}\nCreate one with: myheat config init")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No configuration found")]
    #[diagnostic(
        code(myheat::no_config),
        help("Run: myheat config init\nExpected config at: {path}")
    )]
    NoConfig { path: String },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(myheat::config))]
    Config(Box<figment::Error>),

    #[error("Keyring error: {reason}")]
    #[diagnostic(
        code(myheat::keyring),
        help("Put the key in the profile's `api_key` or in an env var named by `api_key_env`.")
    )]
    Keyring { reason: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    #[diagnostic(code(myheat::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to encode output: {0}")]
    #[diagnostic(code(myheat::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotReady { kind, .. } => match kind {
                ErrorKind::Timeout => exit_code::TIMEOUT,
                ErrorKind::Transport => exit_code::CONNECTION,
                ErrorKind::Rpc => exit_code::AUTH,
                ErrorKind::Decode | ErrorKind::Unknown => exit_code::GENERAL,
            },
            Self::Rejected { .. } | Self::AuthFailed { .. } | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotReady { kind, reason } => CliError::NotReady { kind, reason },

            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },

            CoreError::Timeout { timeout } => CliError::Timeout { timeout },

            CoreError::Rejected { code, body } => {
                tracing::debug!(code, %body, "rejected response");
                CliError::Rejected { code }
            }

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Unloaded => CliError::Unexpected {
                message: "entry has been unloaded".into(),
            },

            CoreError::Decode { message } | CoreError::Internal(message) => {
                CliError::Unexpected { message }
            }
        }
    }
}

impl From<myheat_api::Error> for CliError {
    fn from(err: myheat_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound {
                name: profile,
                available: "(unknown)".into(),
            },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Keyring(e) => CliError::Keyring {
                reason: e.to_string(),
            },
            ConfigError::Serialization(e) => CliError::Io(std::io::Error::other(e)),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
