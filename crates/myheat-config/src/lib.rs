//! Configuration for MyHeat tools.
//!
//! TOML profiles, credential resolution (env var, keyring, plaintext) and
//! translation of a profile into a validated `myheat_core::EntryConfig`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use myheat_core::{CoreError, EntryConfig};

/// Keyring service under which API keys are stored.
pub const KEYRING_SERVICE: &str = "myheat";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: the explicit one, else the configured default.
    pub fn profile_name<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit
            .or(self.default_profile.as_deref())
            .unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request budget in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Polling cadence in seconds.
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            scan_interval: default_scan_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_scan_interval() -> u64 {
    30
}

/// A named device profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Display name used as entity name prefix. Defaults to the profile name.
    pub name: Option<String>,

    /// MyHeat account login.
    pub username: String,

    /// API key (plaintext; prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Default device for every call.
    pub device_id: i64,

    /// Override the RPC endpoint.
    pub endpoint: Option<String>,

    /// Path to an extra CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override polling cadence (seconds).
    pub scan_interval: Option<u64>,

    /// Override request budget (seconds).
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("net", "myheat", "myheat").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("myheat");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
///
/// `MYHEAT_` variables override file values; nested keys use `__`
/// (e.g. `MYHEAT_DEFAULTS__TIMEOUT=20`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("MYHEAT_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to the canonical path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/api-key"))
}

/// Resolve the API key: env var named by the profile, then the system
/// keyring, then plaintext in the config.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's api_key_env → env var lookup
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a profile's API key in the system keyring.
pub fn store_api_key(profile_name: &str, api_key: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(api_key)?;
    Ok(())
}

// ── Profile → EntryConfig ───────────────────────────────────────────

impl Profile {
    /// Check the fields that do not need the API key.
    pub fn validate(&self, profile_name: &str) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: &str| {
            Err(ConfigError::Validation {
                field: field.into(),
                reason: reason.into(),
            })
        };

        if self.display_name(profile_name).trim().is_empty() {
            return invalid("name", "must not be empty");
        }
        if self.username.trim().is_empty() {
            return invalid("username", "must not be empty");
        }
        if self.device_id <= 0 {
            return invalid("device_id", "must be a positive integer");
        }
        if self.scan_interval == Some(0) {
            return invalid("scan_interval", "must be greater than zero");
        }
        if self.timeout == Some(0) {
            return invalid("timeout", "must be greater than zero");
        }
        Ok(())
    }

    pub fn display_name<'a>(&'a self, profile_name: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(profile_name)
    }
}

/// Build a validated `EntryConfig` from a profile and the global defaults.
pub fn profile_to_entry_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<EntryConfig, ConfigError> {
    profile.validate(profile_name)?;
    let api_key = resolve_api_key(profile, profile_name)?;
    build_entry_config(profile, profile_name, defaults, api_key)
}

/// Like [`profile_to_entry_config`] with an already resolved API key.
pub fn build_entry_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    api_key: SecretString,
) -> Result<EntryConfig, ConfigError> {
    profile.validate(profile_name)?;

    let mut config = EntryConfig::new(
        profile.display_name(profile_name),
        profile.username.trim(),
        api_key,
        profile.device_id,
    )
    .map_err(core_validation)?;

    if let Some(ref endpoint) = profile.endpoint {
        config.endpoint = endpoint.parse().map_err(|_| ConfigError::Validation {
            field: "endpoint".into(),
            reason: format!("invalid URL: {endpoint}"),
        })?;
    }
    config.ca_cert.clone_from(&profile.ca_cert);
    config.scan_interval =
        Duration::from_secs(profile.scan_interval.unwrap_or(defaults.scan_interval));
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    config.validate().map_err(core_validation)?;
    Ok(config)
}

#[allow(clippy::needless_pass_by_value)]
fn core_validation(err: CoreError) -> ConfigError {
    ConfigError::Validation {
        field: "profile".into(),
        reason: err.to_string(),
    }
}
