//! Config subcommand handlers.

use std::time::Duration;

use dialoguer::{Input, Password, Select};
use secrecy::SecretString;
use url::Url;

use myheat_api::{Credentials, DEFAULT_ENDPOINT, DeviceSummary, MhClient, TransportConfig};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "scan_interval = {}", cfg.defaults.scan_interval);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        if let Some(ref display) = p.name {
            let _ = writeln!(out, "name = \"{display}\"");
        }
        let _ = writeln!(out, "username = \"{}\"", p.username);
        let _ = writeln!(out, "device_id = {}", p.device_id);
        if p.api_key.is_some() {
            let _ = writeln!(out, "api_key = \"****\"");
        }
        if let Some(ref env) = p.api_key_env {
            let _ = writeln!(out, "api_key_env = \"{env}\"");
        }
        if let Some(ref endpoint) = p.endpoint {
            let _ = writeln!(out, "endpoint = \"{endpoint}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(interval) = p.scan_interval {
            let _ = writeln!(out, "scan_interval = {interval}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out.trim_end().to_owned()
}

/// Copy of `cfg` with every plaintext API key masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.api_key.is_some() {
            profile.api_key = Some("****".into());
        }
    }
    cfg
}

/// Map a dialoguer / interactive I/O failure into CliError.
#[allow(clippy::needless_pass_by_value)]
fn prompt_err(e: dialoguer::Error) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_api_key() -> Result<String, CliError> {
    let key = Password::new()
        .with_prompt("API key")
        .interact()
        .map_err(prompt_err)?;
    if key.trim().is_empty() {
        return Err(CliError::Validation {
            field: "api_key".into(),
            reason: "API key cannot be empty".into(),
        });
    }
    Ok(key.trim().to_owned())
}

/// List the devices these credentials can see.
///
/// An empty list means the credentials were not accepted.
async fn discover_devices(
    username: &str,
    api_key: &str,
    endpoint: Url,
    timeout: Duration,
) -> Result<Vec<DeviceSummary>, CliError> {
    // getDevices ignores the device id.
    let credentials = Credentials::new(username, SecretString::from(api_key.to_owned()), 0);
    let transport = TransportConfig::default().with_timeout(timeout);
    let client = MhClient::new(endpoint, credentials, &transport)?;

    let devices = client.get_devices().await?;
    if devices.is_empty() {
        return Err(CliError::AuthFailed {
            username: username.into(),
        });
    }
    Ok(devices)
}

/// Offer to store the key in the system keyring or return it for plaintext config.
///
/// Returns `Some(key)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_key_storage(key: &str, profile_name: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the API key?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        config::store_api_key(profile_name, key)?;
        eprintln!("   ✓ API key stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(key.to_owned()))
    }
}

// ── Handlers ────────────────────────────────────────────────────────

/// Interactive wizard: credentials, device discovery, key storage.
async fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_file(global);
    eprintln!("MyHeat CLI -- configuration wizard");
    eprintln!("   Config path: {}\n", path.display());

    let mut cfg = config::load(global)?;

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let username: String = Input::new()
        .with_prompt("MyHeat username")
        .interact_text()
        .map_err(prompt_err)?;
    let username = username.trim().to_owned();
    if username.is_empty() {
        return Err(CliError::Validation {
            field: "username".into(),
            reason: "username cannot be empty".into(),
        });
    }

    let api_key = match global.api_key {
        Some(ref key) => key.clone(),
        None => prompt_api_key()?,
    };

    let endpoint = Url::parse(DEFAULT_ENDPOINT).map_err(|e| CliError::Unexpected {
        message: e.to_string(),
    })?;
    let timeout = Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout));
    let devices = discover_devices(&username, &api_key, endpoint, timeout).await?;

    let labels: Vec<String> = devices
        .iter()
        .map(|d| match d.city {
            Some(ref city) => format!("{} ({}, id {})", d.name, city, d.id),
            None => format!("{} (id {})", d.name, d.id),
        })
        .collect();
    let selection = Select::new()
        .with_prompt("Device")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    let device = devices.get(selection).ok_or_else(|| CliError::Validation {
        field: "device".into(),
        reason: "no device selected".into(),
    })?;

    let display_name: String = Input::new()
        .with_prompt("Display name")
        .default(device.name.clone())
        .interact_text()
        .map_err(prompt_err)?;

    let plaintext_key = prompt_key_storage(&api_key, &profile_name)?;

    let profile = Profile {
        name: Some(display_name),
        username,
        api_key: plaintext_key,
        device_id: device.id,
        ..Profile::default()
    };
    profile.validate(&profile_name)?;

    cfg.profiles.insert(profile_name.clone(), profile);
    if cfg.profiles.len() == 1 {
        cfg.default_profile = Some(profile_name.clone());
    }
    config::save_config_to(&cfg, &path)?;

    eprintln!("\n✓ Configuration written to {}", path.display());
    eprintln!("  Profile: {profile_name} (device {})", device.id);
    eprintln!("\n  Test it: myheat info");
    Ok(())
}

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global).await,

        ConfigCommand::Show => {
            let cfg = redacted(&config::load(global)?);
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                config::config_file(global).display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_file(global).display().to_string(), false);
            Ok(())
        }

        ConfigCommand::SetKey { profile } => {
            let cfg = config::load(global)?;
            let profile_name =
                profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            config::find_profile(global, &cfg, &profile_name)?;

            let key = match global.api_key {
                Some(ref key) => key.clone(),
                None => prompt_api_key()?,
            };
            config::store_api_key(&profile_name, &key)?;
            eprintln!("✓ API key stored in system keyring for profile '{profile_name}'");
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load(global)?;
            config::find_profile(global, &cfg, &name)?;
            cfg.default_profile = Some(name.clone());
            config::save_config_to(&cfg, &config::config_file(global))?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                username: "user@example.com".into(),
                api_key: Some("secret".into()),
                device_id: 12,
                ..Profile::default()
            },
        );
        cfg
    }

    #[test]
    fn redacted_text_masks_keys() {
        let text = format_config_redacted(&config());
        assert!(text.contains("[profiles.home]"));
        assert!(text.contains("api_key = \"****\""));
        assert!(!text.contains("secret"));
    }

    #[test]
    fn redacted_copy_masks_keys() {
        let cfg = redacted(&config());
        assert_eq!(cfg.profiles["home"].api_key.as_deref(), Some("****"));
        assert_eq!(cfg.profiles["home"].device_id, 12);
    }
}
