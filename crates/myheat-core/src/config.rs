// ── Per-entry configuration ──
//
// Everything one configured device needs to run: credentials, endpoint,
// polling cadence and transport budget. Built by myheat-config from the
// user's profile, or directly by embedders.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use myheat_api::{Credentials, DEFAULT_ENDPOINT, TlsMode, TransportConfig, transport};

use crate::error::CoreError;

/// Default polling cadence.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for one MyHeat device entry.
#[derive(Debug, Clone)]
pub struct EntryConfig {
    /// Display name; prefixes every entity name.
    pub name: String,
    pub username: String,
    pub api_key: SecretString,
    pub device_id: i64,
    pub endpoint: Url,
    pub scan_interval: Duration,
    pub timeout: Duration,
    /// Extra CA certificate to trust, for proxies in front of the endpoint.
    pub ca_cert: Option<PathBuf>,
}

impl EntryConfig {
    /// A config against the public endpoint with default cadence.
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        api_key: SecretString,
        device_id: i64,
    ) -> Result<Self, CoreError> {
        let endpoint = Url::parse(DEFAULT_ENDPOINT).map_err(|e| CoreError::Internal(e.to_string()))?;
        Ok(Self {
            name: name.into(),
            username: username.into(),
            api_key,
            device_id,
            endpoint,
            scan_interval: DEFAULT_SCAN_INTERVAL,
            timeout: transport::DEFAULT_TIMEOUT,
            ca_cert: None,
        })
    }

    /// Stable identifier of the entry, shared by all its entities.
    pub fn entry_id(&self) -> String {
        format!("myheat-{}", self.device_id)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.api_key.clone(), self.device_id)
    }

    pub fn transport(&self) -> TransportConfig {
        let tls = self
            .ca_cert
            .clone()
            .map_or(TlsMode::System, TlsMode::CustomCa);
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }

    /// Reject configurations that could never produce a working entry.
    pub fn validate(&self) -> Result<(), CoreError> {
        let fail = |message: &str| {
            Err(CoreError::ValidationFailed {
                message: message.to_owned(),
            })
        };

        if self.name.trim().is_empty() {
            return fail("name must not be empty");
        }
        if self.username.trim().is_empty() {
            return fail("username must not be empty");
        }
        if self.api_key.expose_secret().is_empty() {
            return fail("api key must not be empty");
        }
        if self.device_id <= 0 {
            return fail("device id must be a positive integer");
        }
        if self.scan_interval.is_zero() {
            return fail("scan interval must be greater than zero");
        }
        if self.timeout.is_zero() {
            return fail("timeout must be greater than zero");
        }
        if !matches!(self.endpoint.scheme(), "http" | "https") {
            return fail("endpoint must be an http(s) URL");
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> EntryConfig {
        EntryConfig::new("Home", "user", "key".to_string().into(), 12).unwrap()
    }

    #[test]
    fn defaults_match_public_endpoint() {
        let config = config();
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(config.scan_interval, Duration::from_secs(30));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.entry_id(), "myheat-12");
        config.validate().unwrap();
    }

    #[test]
    fn rejects_blank_fields() {
        let mut bad = config();
        bad.username = "  ".into();
        assert!(matches!(bad.validate(), Err(CoreError::ValidationFailed { .. })));

        let mut bad = config();
        bad.api_key = String::new().into();
        assert!(bad.validate().is_err());

        let mut bad = config();
        bad.device_id = 0;
        assert!(bad.validate().is_err());

        let mut bad = config();
        bad.scan_interval = Duration::ZERO;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn custom_ca_selects_tls_mode() {
        let mut config = config();
        config.ca_cert = Some(PathBuf::from("/etc/ca.pem"));
        assert_eq!(
            config.transport().tls,
            TlsMode::CustomCa(PathBuf::from("/etc/ca.pem"))
        );
    }
}
