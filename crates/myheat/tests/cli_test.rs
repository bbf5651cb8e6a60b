//! Integration tests for the `myheat` CLI binary.
//!
//! Argument parsing, help output and completions run without a server;
//! device commands run against a wiremock RPC endpoint.
#![allow(clippy::unwrap_used)]

use std::path::PathBuf;
use std::process::Output;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const RPC_PATH: &str = "/api/request/";

/// Build a [`Command`] for the `myheat` binary with env isolation.
///
/// Clears all `MYHEAT_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn myheat_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("myheat");
    cmd.env("HOME", "/tmp/myheat-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/myheat-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("MYHEAT_PROFILE")
        .env_remove("MYHEAT_DEVICE")
        .env_remove("MYHEAT_API_KEY")
        .env_remove("MYHEAT_CONFIG")
        .env_remove("MYHEAT_OUTPUT")
        .env_remove("MYHEAT_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Temporary config file with one profile pointing at `server`.
struct Fixture {
    _dir: tempfile::TempDir,
    config: PathBuf,
}

fn fixture(server: &MockServer) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(
        &config,
        format!(
            r#"
default_profile = "home"

[profiles.home]
name = "Home"
username = "test_username"
device_id = 12
endpoint = "{}{RPC_PATH}"
timeout = 2
scan_interval = 1
"#,
            server.uri()
        ),
    )
    .unwrap();
    Fixture { _dir: dir, config }
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(fixture: &Fixture, args: &[&str]) -> Output {
    let mut cmd = myheat_cmd();
    cmd.arg("--config")
        .arg(&fixture.config)
        .args(["--api-key", "test_password"])
        .args(args);
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn device_info() -> Value {
    json!({
        "heaters": [{"id": 13, "name": "Vaillant", "flowTemp": 56, "pressure": 2.2,
                     "burnerWater": true}],
        "envs": [
            {"id": 21, "type": "boiler_temperature", "name": "Boiler",
             "value": 46.5, "target": 45, "severity": 1},
            {"id": 30, "type": "room_temperature", "name": "Living room",
             "value": 20.5, "target": 21, "demand": true, "severity": 1}
        ],
        "engs": [{"id": 40, "type": "pump", "name": "Pump", "turnedOn": true, "severity": 1}],
        "alarms": {},
        "dataActual": true,
        "severity": 1,
        "severityDesc": "ok",
        "weatherTemp": "-6.78999999999996",
        "city": "Town"
    })
}

fn ok_with(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"err": 0, "data": data, "refreshPage": false}))
}

async fn mount_action(server: &MockServer, action: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(body_partial_json(json!({"action": action})))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn bodies_for(server: &MockServer, action: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| serde_json::from_slice::<Value>(&r.body).unwrap())
        .filter(|body| body["action"] == action)
        .collect()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = myheat_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    myheat_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("MyHeat")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("heating-mode"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    myheat_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("myheat"));
}

#[test]
fn test_completions_bash() {
    myheat_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Argument validation ─────────────────────────────────────────────

#[test]
fn test_heating_mode_requires_mode_or_schedule() {
    myheat_cmd().arg("heating-mode").assert().code(2);
}

#[test]
fn test_env_goal_needs_value_or_off() {
    myheat_cmd().args(["env", "goal", "21"]).assert().code(2);
    myheat_cmd()
        .args(["env", "goal", "21", "45", "--off"])
        .assert()
        .code(2);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_flag() {
    myheat_cmd()
        .args(["--config", "/tmp/elsewhere/myheat.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/elsewhere/myheat.toml"));
}

#[test]
fn test_missing_config_is_reported() {
    let output = myheat_cmd().arg("devices").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("config init"), "Expected hint in output:\n{text}");
}

#[tokio::test]
async fn test_config_show_redacts_plaintext_keys() {
    let server = MockServer::start().await;
    let fixture = fixture(&server);
    let mut content = std::fs::read_to_string(&fixture.config).unwrap();
    content.push_str("api_key = \"very-secret\"\n");
    std::fs::write(&fixture.config, content).unwrap();

    let output = run(&fixture, &["config", "show"]).await;
    assert!(output.status.success());
    let text = combined_output(&output);
    assert!(text.contains("[profiles.home]"));
    assert!(!text.contains("very-secret"), "key leaked:\n{text}");
}

#[tokio::test]
async fn test_unknown_profile_lists_alternatives() {
    let server = MockServer::start().await;
    let fixture = fixture(&server);

    let output = run(&fixture, &["--profile", "cabin", "devices"]).await;
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("home"));
}

#[tokio::test]
async fn test_invalid_device_override_is_a_usage_error() {
    let server = MockServer::start().await;
    let fixture = fixture(&server);

    let output = run(&fixture, &["--device", "0", "info"]).await;
    assert_eq!(output.status.code(), Some(2));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Reads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_devices_json() {
    let server = MockServer::start().await;
    mount_action(
        &server,
        "getDevices",
        ok_with(json!({"devices": [
            {"id": 12, "name": "Bridge", "city": "Town", "severity": 1},
            {"id": 10, "name": "Dacha", "severity": 1}
        ]})),
    )
    .await;
    let fixture = fixture(&server);

    let output = run(&fixture, &["devices", "-o", "json"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let devices: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(devices[0]["id"], 12);
    assert_eq!(devices[1]["name"], "Dacha");

    let body = &bodies_for(&server, "getDevices").await[0];
    assert_eq!(body["login"], "test_username");
    assert_eq!(body["key"], "test_password");
}

#[tokio::test]
async fn test_info_json_is_verbatim() {
    let server = MockServer::start().await;
    mount_action(&server, "getDeviceInfo", ok_with(device_info())).await;
    let fixture = fixture(&server);

    let output = run(&fixture, &["info", "-o", "json"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let data: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(data, device_info());
    assert_eq!(bodies_for(&server, "getDeviceInfo").await[0]["deviceId"], 12);
}

#[tokio::test]
async fn test_device_flag_selects_device() {
    let server = MockServer::start().await;
    mount_action(&server, "getDeviceInfo", ok_with(device_info())).await;
    let fixture = fixture(&server);

    let output = run(&fixture, &["--device", "10", "info", "-o", "plain"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("env 30"));
    assert_eq!(bodies_for(&server, "getDeviceInfo").await[0]["deviceId"], 10);
}

#[tokio::test]
async fn test_rpc_rejection_exits_with_auth_code() {
    let server = MockServer::start().await;
    mount_action(
        &server,
        "getDevices",
        ResponseTemplate::new(200).set_body_json(json!({"err": 1, "refreshPage": false})),
    )
    .await;
    let fixture = fixture(&server);

    let output = run(&fixture, &["devices"]).await;
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("err=1"));
}

#[tokio::test]
async fn test_entities_plain_lists_unique_ids() {
    let server = MockServer::start().await;
    mount_action(&server, "getDeviceInfo", ok_with(device_info())).await;
    let fixture = fixture(&server);

    let output = run(&fixture, &["entities", "-o", "plain"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("myheat-12weatherTemp\t-6.78999999999996"));
    assert!(stdout.contains("myheat-12heater13flowTemp\t56"));
    assert!(stdout.contains("myheat-12security\tunknown"));
}

#[tokio::test]
async fn test_entities_platform_filter() {
    let server = MockServer::start().await;
    mount_action(&server, "getDeviceInfo", ok_with(device_info())).await;
    let fixture = fixture(&server);

    let output = run(&fixture, &["entities", "--platform", "climate", "-o", "json"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let entities: Value = serde_json::from_slice(&output.stdout).unwrap();
    let entities = entities.as_array().unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0]["platform"], "climate");
    assert_eq!(entities[0]["name"], "Home Living room");
}

// ── Refresh ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_reports_success() {
    let server = MockServer::start().await;
    mount_action(&server, "getDeviceInfo", ok_with(device_info())).await;
    let fixture = fixture(&server);

    let output = run(&fixture, &["refresh", "-o", "json"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["sequence"], 1);
    assert_eq!(report["success"], true);
    assert_eq!(report["data_actual"], true);
}

#[tokio::test]
async fn test_refresh_http_failure_exits_with_connection_code() {
    let server = MockServer::start().await;
    mount_action(
        &server,
        "getDeviceInfo",
        ResponseTemplate::new(502).set_body_string("bad gateway"),
    )
    .await;
    let fixture = fixture(&server);

    let output = run(&fixture, &["refresh", "-o", "json"]).await;
    assert_eq!(output.status.code(), Some(7));

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["success"], false);
    assert_eq!(report["kind"], "transport");
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_env_off_sends_null_goal_and_refreshes() {
    let server = MockServer::start().await;
    mount_action(&server, "getDeviceInfo", ok_with(device_info())).await;
    mount_action(&server, "setEnvGoal", ok_with(json!({}))).await;
    let fixture = fixture(&server);

    let output = run(&fixture, &["env", "goal", "21", "--off"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let writes = bodies_for(&server, "setEnvGoal").await;
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0]["objId"], 21);
    assert_eq!(writes[0]["goal"], Value::Null);
    assert_eq!(writes[0]["changeMode"], 0);
    // setup + forced refresh
    assert_eq!(bodies_for(&server, "getDeviceInfo").await.len(), 2);
}

#[tokio::test]
async fn test_eng_goal_forwards_change_mode() {
    let server = MockServer::start().await;
    mount_action(&server, "getDeviceInfo", ok_with(device_info())).await;
    mount_action(&server, "setEngGoal", ok_with(json!({}))).await;
    let fixture = fixture(&server);

    let output = run(&fixture, &["eng", "goal", "40", "0", "--change-mode"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let writes = bodies_for(&server, "setEngGoal").await;
    assert_eq!(writes[0]["goal"], 0);
    assert_eq!(writes[0]["changeMode"], 1);
}

#[tokio::test]
async fn test_heating_schedule_omits_mode() {
    let server = MockServer::start().await;
    mount_action(&server, "getDeviceInfo", ok_with(device_info())).await;
    mount_action(&server, "setHeatingMode", ok_with(json!({}))).await;
    let fixture = fixture(&server);

    let output = run(&fixture, &["heating-mode", "--schedule", "3"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let body = &bodies_for(&server, "setHeatingMode").await[0];
    assert_eq!(body["scheduleId"], 3);
    assert!(body.get("modeId").is_none());
}

#[tokio::test]
async fn test_heating_mode_reset_with_schedule_sends_both() {
    let server = MockServer::start().await;
    mount_action(&server, "getDeviceInfo", ok_with(device_info())).await;
    mount_action(&server, "setHeatingMode", ok_with(json!({}))).await;
    let fixture = fixture(&server);

    let output = run(&fixture, &["heating-mode", "--mode", "0", "--schedule", "1"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let body = &bodies_for(&server, "setHeatingMode").await[0];
    assert_eq!(body["modeId"], 0);
    assert_eq!(body["scheduleId"], 1);
}

#[tokio::test]
async fn test_security_on_refreshes_after_toggle() {
    let server = MockServer::start().await;
    mount_action(&server, "getDeviceInfo", ok_with(device_info())).await;
    mount_action(&server, "setSecurityMode", ok_with(json!({}))).await;
    let fixture = fixture(&server);

    let output = run(&fixture, &["security", "on"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    assert_eq!(bodies_for(&server, "setSecurityMode").await[0]["mode"], 1);
    assert_eq!(bodies_for(&server, "getDeviceInfo").await.len(), 2);
}

#[tokio::test]
async fn test_rejected_write_exits_with_auth_code() {
    let server = MockServer::start().await;
    mount_action(&server, "getDeviceInfo", ok_with(device_info())).await;
    mount_action(
        &server,
        "setEnvCurve",
        ResponseTemplate::new(200).set_body_json(json!({"err": 4})),
    )
    .await;
    let fixture = fixture(&server);

    let output = run(&fixture, &["env", "curve", "24", "3"]).await;
    assert_eq!(output.status.code(), Some(3));
}

// ── Watch ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_watch_prints_a_line_per_update() {
    let server = MockServer::start().await;
    mount_action(&server, "getDeviceInfo", ok_with(device_info())).await;
    let fixture = fixture(&server);

    let output = run(&fixture, &["watch", "--count", "2", "-o", "json"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let lines: Vec<Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["sequence"], 1);
    assert_eq!(lines[1]["sequence"], 2);
    assert_eq!(lines[1]["success"], true);
    assert_eq!(lines[1]["severity"], 1);
}

#[tokio::test]
async fn test_watch_rejects_zero_interval() {
    let server = MockServer::start().await;
    let fixture = fixture(&server);

    let output = run(&fixture, &["watch", "--interval", "0"]).await;
    assert_eq!(output.status.code(), Some(2));
}
