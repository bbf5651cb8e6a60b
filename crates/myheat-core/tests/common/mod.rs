#![allow(clippy::unwrap_used, dead_code)]
// Shared fixtures for myheat-core integration tests.

use std::time::Duration;

use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use myheat_api::{Credentials, MhClient};
use myheat_core::{Coordinator, EntryConfig};

pub const RPC_PATH: &str = "/api/request/";

pub fn device_info() -> Value {
    json!({
        "heaters": [{
            "id": 13, "name": "Vaillant", "disabled": false,
            "flowTemp": 56, "returnTemp": 56, "pressure": 2.223,
            "targetTemp": 0, "burnerHeating": false, "burnerWater": true,
            "modulation": 0
        }],
        "envs": [
            {"id": 21, "type": "boiler_temperature", "name": "Boiler",
             "value": 46.687, "target": 45, "demand": false,
             "severity": 1, "severityDesc": "ok"},
            {"id": 24, "type": "circuit_temperature", "name": "Circuit",
             "value": 56, "target": null, "demand": false,
             "severity": 1, "severityDesc": "ok"},
            {"id": 30, "type": "room_temperature", "name": "Living room",
             "value": 20.5, "target": 21, "demand": true,
             "severity": 1, "severityDesc": "ok"}
        ],
        "engs": [{"id": 40, "type": "pump", "name": "Pump", "turnedOn": true,
                  "severity": 1, "severityDesc": "ok"}],
        "alarms": {},
        "dataActual": true,
        "severity": 1,
        "severityDesc": "ok",
        "weatherTemp": "-6.78999999999996",
        "city": "Town"
    })
}

pub fn ok_with(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"err": 0, "data": data, "refreshPage": false}))
}

pub fn endpoint(server: &MockServer) -> Url {
    Url::parse(&format!("{}{RPC_PATH}", server.uri())).unwrap()
}

pub fn entry_config(server: &MockServer) -> EntryConfig {
    let mut config = EntryConfig::new("Home", "test_username", "test_password".to_string().into(), 12).unwrap();
    config.endpoint = endpoint(server);
    config.timeout = Duration::from_secs(2);
    config
}

pub fn coordinator(server: &MockServer, scan_interval: Duration) -> Coordinator {
    let client = MhClient::with_client(
        reqwest::Client::new(),
        endpoint(server),
        Credentials::new("test_username", "test_password".to_string().into(), 12),
        Duration::from_secs(2),
    );
    Coordinator::new(client, scan_interval)
}

/// Answer every `getDeviceInfo` with `data`.
pub async fn mount_device_info(server: &MockServer, data: Value) {
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(body_partial_json(json!({"action": "getDeviceInfo"})))
        .respond_with(ok_with(data))
        .mount(server)
        .await;
}

/// Accept every write with `{"err": 0}`.
pub async fn mount_write(server: &MockServer, action: &str) {
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(body_partial_json(json!({"action": action})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"err": 0})))
        .mount(server)
        .await;
}

/// Bodies of every request the server received for `action`.
pub async fn bodies_for(server: &MockServer, action: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| serde_json::from_slice::<Value>(&r.body).unwrap())
        .filter(|body| body["action"] == action)
        .collect()
}
