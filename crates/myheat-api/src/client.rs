// MyHeat RPC client
//
// Every logical action is one POST of `{action, login, key, ...}` to a
// single endpoint. Responses are `{err, data?, refreshPage?}`; the envelope
// is stripped before the caller sees the payload.

use std::time::Duration;

use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::models::{DeviceInfo, DeviceList, DeviceSummary, RpcResponse};
use crate::transport::TransportConfig;

/// The vendor's public RPC endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://my.myheat.net/api/request/";

// ── Action parameters ────────────────────────────────────────────────

#[derive(Serialize)]
struct NoParams {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeviceParams {
    device_id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvGoalParams {
    device_id: i64,
    obj_id: i64,
    /// `null` switches the environment off.
    goal: Option<f64>,
    change_mode: u8,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvCurveParams {
    device_id: i64,
    obj_id: i64,
    curve: i64,
    change_mode: u8,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EngGoalParams {
    device_id: i64,
    obj_id: i64,
    goal: i64,
    change_mode: u8,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HeatingModeParams {
    device_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule_id: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SecurityModeParams {
    device_id: i64,
    mode: u8,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the MyHeat cloud RPC API.
///
/// Stateless apart from the static credentials: no caching, no retries.
/// Each call is bounded by the transport timeout and every failure is
/// returned to the caller.
#[derive(Debug, Clone)]
pub struct MhClient {
    http: reqwest::Client,
    endpoint: Url,
    credentials: Credentials,
    timeout: Duration,
}

impl MhClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client against `endpoint` using the shared transport settings.
    pub fn new(
        endpoint: Url,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            endpoint,
            credentials,
            timeout: transport.timeout,
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        endpoint: Url,
        credentials: Credentials,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            endpoint,
            credentials,
            timeout,
        }
    }

    /// The configured default device id.
    pub fn device_id(&self) -> i64 {
        self.credentials.device_id
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    fn target(&self, device_id: Option<i64>) -> i64 {
        device_id.unwrap_or(self.credentials.device_id)
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// List the devices visible to these credentials.
    pub async fn get_devices(&self) -> Result<Vec<DeviceSummary>, Error> {
        let data = self.rpc("getDevices", &NoParams {}).await?;
        let list: DeviceList = serde_json::from_value(data.clone()).map_err(|e| Error::Decode {
            message: e.to_string(),
            body: data.to_string(),
        })?;
        Ok(list.devices)
    }

    /// Fetch the full state of a device (the configured one by default).
    pub async fn get_device_info(&self, device_id: Option<i64>) -> Result<DeviceInfo, Error> {
        let params = DeviceParams {
            device_id: self.target(device_id),
        };
        let data = self.rpc("getDeviceInfo", &params).await?;
        DeviceInfo::from_data(data)
    }

    /// Set an environment's target temperature. `None` switches it off.
    pub async fn set_env_goal(
        &self,
        obj_id: i64,
        goal: Option<f64>,
        device_id: Option<i64>,
        change_mode: bool,
    ) -> Result<(), Error> {
        let params = EnvGoalParams {
            device_id: self.target(device_id),
            obj_id,
            goal,
            change_mode: u8::from(change_mode),
        };
        self.rpc("setEnvGoal", &params).await.map(drop)
    }

    /// Set an environment's heating curve.
    pub async fn set_env_curve(
        &self,
        obj_id: i64,
        curve: i64,
        device_id: Option<i64>,
        change_mode: bool,
    ) -> Result<(), Error> {
        let params = EnvCurveParams {
            device_id: self.target(device_id),
            obj_id,
            curve,
            change_mode: u8::from(change_mode),
        };
        self.rpc("setEnvCurve", &params).await.map(drop)
    }

    /// Set an engineering component's goal (on/off for pumps).
    pub async fn set_eng_goal(
        &self,
        obj_id: i64,
        goal: i64,
        device_id: Option<i64>,
        change_mode: bool,
    ) -> Result<(), Error> {
        let params = EngGoalParams {
            device_id: self.target(device_id),
            obj_id,
            goal,
            change_mode: u8::from(change_mode),
        };
        self.rpc("setEngGoal", &params).await.map(drop)
    }

    /// Switch the heating mode or schedule.
    ///
    /// Only one of `mode_id` / `schedule_id` should be given; `0` resets the
    /// mode. Absent ids are left out of the request body entirely.
    pub async fn set_heating_mode(
        &self,
        device_id: Option<i64>,
        mode_id: Option<i64>,
        schedule_id: Option<i64>,
    ) -> Result<(), Error> {
        if mode_id.is_none() && schedule_id.is_none() {
            debug!("setHeatingMode without modeId or scheduleId");
        }
        let params = HeatingModeParams {
            device_id: self.target(device_id),
            mode_id,
            schedule_id,
        };
        self.rpc("setHeatingMode", &params).await.map(drop)
    }

    /// Arm or disarm the security alarm.
    pub async fn set_security_mode(&self, mode: bool, device_id: Option<i64>) -> Result<(), Error> {
        let params = SecurityModeParams {
            device_id: self.target(device_id),
            mode: u8::from(mode),
        };
        self.rpc("setSecurityMode", &params).await.map(drop)
    }

    // ── Transport ────────────────────────────────────────────────────

    /// Perform one RPC call and return the unwrapped `data` payload.
    ///
    /// `params` must serialize to a JSON object; its fields are merged with
    /// `action`, `login` and `key`. A missing `data` yields an empty object.
    pub async fn rpc(&self, action: &str, params: &impl Serialize) -> Result<Value, Error> {
        let body = self.request_body(action, params)?;
        debug!(action, endpoint = %self.endpoint, "rpc request");

        let result = match tokio::time::timeout(self.timeout, self.send(&body)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                timeout: self.timeout,
            }),
        };

        match result {
            Ok(data) => {
                trace!(action, %data, "rpc response");
                Ok(data)
            }
            Err(e) => {
                warn!(action, kind = %e.kind(), error = %e, "rpc call failed");
                Err(e)
            }
        }
    }

    fn request_body(&self, action: &str, params: &impl Serialize) -> Result<Value, Error> {
        let mut fields = match serde_json::to_value(params) {
            Ok(Value::Object(map)) => map,
            Ok(Value::Null) => Map::new(),
            Ok(other) => {
                return Err(Error::Unknown(format!(
                    "rpc params for {action} must be an object, got {other}"
                )));
            }
            Err(e) => return Err(Error::Unknown(format!("failed to encode {action}: {e}"))),
        };

        fields.insert("action".into(), Value::from(action));
        fields.insert(
            "login".into(),
            Value::from(self.credentials.username.as_str()),
        );
        fields.insert(
            "key".into(),
            Value::from(self.credentials.api_key.expose_secret()),
        );
        Ok(Value::Object(fields))
    }

    async fn send(&self, body: &Value) -> Result<Value, Error> {
        let resp = self
            .http
            .post(self.endpoint.clone())
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/json; charset=UTF-8",
            )
            .json(body)
            .send()
            .await
            .map_err(|e| Error::from_reqwest(e, self.timeout))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| Error::from_reqwest(e, self.timeout))?;

        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_envelope(&text)
    }
}

/// Validate the `{err, data?, refreshPage?}` envelope.
fn parse_envelope(text: &str) -> Result<Value, Error> {
    let json: Value = serde_json::from_str(text).map_err(|e| Error::Decode {
        message: format!("response is not JSON: {e}"),
        body: text.to_owned(),
    })?;

    let envelope: RpcResponse = serde_json::from_value(json).map_err(|e| Error::Decode {
        message: format!("unexpected envelope: {e}"),
        body: text.to_owned(),
    })?;

    if envelope.err != 0 {
        return Err(Error::Rpc {
            code: envelope.err,
            body: text.to_owned(),
        });
    }

    Ok(envelope.into_data())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> MhClient {
        MhClient::with_client(
            reqwest::Client::new(),
            Url::parse(DEFAULT_ENDPOINT).unwrap(),
            Credentials::new("user", "secret".to_string().into(), 12),
            Duration::from_secs(10),
        )
    }

    #[test]
    fn body_merges_credentials_and_params() {
        let body = client()
            .request_body("getDeviceInfo", &DeviceParams { device_id: 12 })
            .unwrap();
        assert_eq!(
            body,
            json!({"action": "getDeviceInfo", "login": "user", "key": "secret", "deviceId": 12})
        );
    }

    #[test]
    fn non_object_params_are_rejected() {
        let err = client().request_body("x", &[1, 2]).unwrap_err();
        assert!(matches!(err, Error::Unknown(_)));
    }

    #[test]
    fn envelope_success_returns_data() {
        let data = parse_envelope(r#"{"err":0,"data":{"a":1}}"#).unwrap();
        assert_eq!(data, json!({"a": 1}));
    }

    #[test]
    fn envelope_error_carries_code_and_raw_body() {
        let err = parse_envelope(r#"{"err":7,"refreshPage":true}"#).unwrap_err();
        assert_eq!(err.rpc_code(), Some(7));
        assert_eq!(err.body(), Some(r#"{"err":7,"refreshPage":true}"#));
    }

    #[test]
    fn envelope_without_err_is_a_decode_error() {
        assert!(matches!(
            parse_envelope(r#"{"data":{}}"#),
            Err(Error::Decode { .. })
        ));
        assert!(matches!(
            parse_envelope("<html>"),
            Err(Error::Decode { .. })
        ));
    }
}
