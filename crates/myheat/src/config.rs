//! CLI configuration -- thin wrapper around `myheat_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--config,
//! --device, --api-key, --timeout).

use std::path::PathBuf;

use secrecy::SecretString;

use myheat_core::EntryConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use myheat_config::{Config, Profile, load_config_from, save_config_to, store_api_key};

/// Config file in use: `--config`, else the platform default.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(myheat_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(load_config_from(&config_file(global))?)
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref()).to_owned()
}

/// Look up a profile, listing the alternatives when it is missing.
pub fn find_profile<'a>(
    global: &GlobalOpts,
    config: &'a Config,
    name: &str,
) -> Result<&'a Profile, CliError> {
    if config.profiles.is_empty() {
        return Err(CliError::NoConfig {
            path: config_file(global).display().to_string(),
        });
    }
    config.profiles.get(name).ok_or_else(|| {
        let mut available: Vec<_> = config.profiles.keys().cloned().collect();
        available.sort();
        CliError::ProfileNotFound {
            name: name.into(),
            available: available.join(", "),
        }
    })
}

/// Build the `EntryConfig` for the active profile.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_entry_config(global: &GlobalOpts) -> Result<EntryConfig, CliError> {
    let cfg = load(global)?;
    let profile_name = active_profile_name(global, &cfg);
    let mut profile = find_profile(global, &cfg, &profile_name)?.clone();

    if let Some(device) = global.device {
        profile.device_id = device;
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    let entry = match global.api_key {
        Some(ref key) => myheat_config::build_entry_config(
            &profile,
            &profile_name,
            &cfg.defaults,
            SecretString::from(key.clone()),
        )?,
        None => myheat_config::profile_to_entry_config(&profile, &profile_name, &cfg.defaults)?,
    };
    Ok(entry)
}
