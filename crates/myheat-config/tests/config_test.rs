#![allow(clippy::unwrap_used)]
// Loading, saving and translating config files on disk.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::ExposeSecret;

use myheat_config::{
    Config, ConfigError, Defaults, Profile, load_config_from, profile_to_entry_config,
    save_config_to,
};

const SAMPLE: &str = r#"
default_profile = "home"

[defaults]
output = "json"
timeout = 15

[profiles.home]
name = "Dacha"
username = "user@example.com"
api_key = "plain-key"
device_id = 12
scan_interval = 60

[profiles.office]
username = "office@example.com"
api_key_env = "MYHEAT_TEST_KEY_THAT_IS_NEVER_SET"
device_id = 10
endpoint = "http://127.0.0.1:8080/api/request/"
"#;

fn write_sample() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, SAMPLE).unwrap();
    (dir, path)
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config_from(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(config.default_profile.as_deref(), Some("default"));
    assert_eq!(config.defaults.timeout, 10);
    assert_eq!(config.defaults.scan_interval, 30);
    assert!(config.profiles.is_empty());
}

#[test]
fn test_loads_profiles_and_defaults() {
    let (_dir, path) = write_sample();
    let config = load_config_from(&path).unwrap();

    assert_eq!(config.profile_name(None), "home");
    assert_eq!(config.defaults.output, "json");
    assert_eq!(config.defaults.timeout, 15);
    assert_eq!(config.defaults.scan_interval, 30);

    let home = config.profile("home").unwrap();
    assert_eq!(home.device_id, 12);
    assert_eq!(home.display_name("home"), "Dacha");
    assert_eq!(config.profile("office").unwrap().display_name("office"), "office");
}

#[test]
fn test_profile_becomes_entry_config() {
    let (_dir, path) = write_sample();
    let config = load_config_from(&path).unwrap();
    let home = config.profile("home").unwrap();

    let entry = profile_to_entry_config(home, "myheat-config-test-home", &config.defaults).unwrap();

    assert_eq!(entry.name, "Dacha");
    assert_eq!(entry.username, "user@example.com");
    assert_eq!(entry.api_key.expose_secret(), "plain-key");
    assert_eq!(entry.device_id, 12);
    assert_eq!(entry.scan_interval, Duration::from_secs(60));
    assert_eq!(entry.timeout, Duration::from_secs(15));
    assert_eq!(entry.endpoint.as_str(), "https://my.myheat.net/api/request/");
}

#[test]
fn test_profile_without_any_key_has_no_credentials() {
    let (_dir, path) = write_sample();
    let config = load_config_from(&path).unwrap();
    let office = config.profile("office").unwrap();

    let err = profile_to_entry_config(office, "myheat-config-test-office", &config.defaults)
        .unwrap_err();

    assert!(matches!(err, ConfigError::NoCredentials { .. }), "got: {err:?}");
}

#[test]
fn test_saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let mut config = Config::default();
    config.profiles.insert(
        "default".into(),
        Profile {
            username: "user".into(),
            api_key: Some("k".into()),
            device_id: 7,
            ..Profile::default()
        },
    );

    save_config_to(&config, &path).unwrap();
    let loaded = load_config_from(&path).unwrap();

    assert_eq!(loaded.profile("default").unwrap().device_id, 7);
    assert_eq!(loaded.defaults.output, Defaults::default().output);
}

#[test]
fn test_malformed_file_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[profiles.home]\ndevice_id = \"twelve\"\n").unwrap();

    let err = load_config_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Figment(_)));
}
