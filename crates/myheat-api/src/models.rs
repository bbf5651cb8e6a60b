// RPC wire models
//
// Every response is wrapped in the `{ err, data?, refreshPage? }` envelope.
// Record fields use `#[serde(default)]` liberally: the vendor omits keys
// for hardware that does not report them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::error::Error;

/// Severity code the vendor uses for "everything is fine".
pub const SEVERITY_NORMAL: i64 = 1;

// ── Response Envelope ────────────────────────────────────────────────

/// Standard MyHeat response envelope. `err == 0` means success.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    pub err: i64,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, rename = "refreshPage")]
    pub refresh_page: Option<bool>,
}

impl RpcResponse {
    /// The payload, or an empty mapping when the envelope carries none.
    pub fn into_data(self) -> Value {
        self.data.unwrap_or_else(|| Value::Object(Map::new()))
    }
}

// ── Devices ──────────────────────────────────────────────────────────

/// One entry of the `getDevices` listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSummary {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub severity: Option<i64>,
    #[serde(default)]
    pub severity_desc: Option<String>,
}

/// Payload of `getDevices`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceList {
    #[serde(default)]
    pub devices: Vec<DeviceSummary>,
}

// ── Device state ─────────────────────────────────────────────────────

/// A boiler or other heat source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heater {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub flow_temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub return_temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub pressure: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub target_temp: Option<f64>,
    #[serde(default)]
    pub burner_heating: bool,
    #[serde(default)]
    pub burner_water: bool,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub modulation: Option<f64>,
}

/// Known thermal-environment type tags.
#[derive(Debug, Clone, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum EnvType {
    RoomTemperature,
    BoilerTemperature,
    CircuitTemperature,
    #[strum(default)]
    Other(String),
}

/// A thermal environment: room, hot-water boiler, heating circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Env {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: Option<f64>,
    /// `None` means the environment is switched off.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub target: Option<f64>,
    #[serde(default)]
    pub demand: bool,
    #[serde(default)]
    pub severity: Option<i64>,
    #[serde(default)]
    pub severity_desc: Option<String>,
}

impl Env {
    pub fn env_type(&self) -> EnvType {
        self.kind
            .parse()
            .unwrap_or_else(|_| EnvType::Other(self.kind.clone()))
    }

    pub fn is_room(&self) -> bool {
        self.env_type() == EnvType::RoomTemperature
    }
}

/// An engineering component, typically a circulation pump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eng {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub turned_on: bool,
    #[serde(default)]
    pub severity: Option<i64>,
    #[serde(default)]
    pub severity_desc: Option<String>,
}

/// Payload of `getDeviceInfo`.
///
/// The typed fields are a validated view; the `data` object exactly as
/// received is kept alongside and available through [`DeviceInfo::raw`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    #[serde(default)]
    pub heaters: Vec<Heater>,
    #[serde(default)]
    pub envs: Vec<Env>,
    #[serde(default)]
    pub engs: Vec<Eng>,
    #[serde(default)]
    pub alarms: Value,
    #[serde(default)]
    pub data_actual: bool,
    #[serde(default)]
    pub severity: Option<i64>,
    #[serde(default)]
    pub severity_desc: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weather_temp: Option<f64>,
    #[serde(default)]
    pub city: Option<String>,

    #[serde(skip)]
    raw: Value,
}

impl DeviceInfo {
    /// Validate a `getDeviceInfo` payload against the documented shape.
    pub fn from_data(data: Value) -> Result<Self, Error> {
        if !data.is_object() {
            return Err(Error::Decode {
                message: "device info payload is not an object".into(),
                body: data.to_string(),
            });
        }

        let mut info: Self = serde_json::from_value(data.clone()).map_err(|e| Error::Decode {
            message: e.to_string(),
            body: data.to_string(),
        })?;
        info.raw = data;
        Ok(info)
    }

    /// The `data` object exactly as the endpoint returned it.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// First heater with the given id.
    pub fn heater(&self, id: i64) -> Option<&Heater> {
        self.heaters.iter().find(|h| h.id == id)
    }

    /// First environment with the given id.
    pub fn env(&self, id: i64) -> Option<&Env> {
        self.envs.iter().find(|e| e.id == id)
    }

    /// First engineering component with the given id.
    pub fn eng(&self, id: i64) -> Option<&Eng> {
        self.engs.iter().find(|e| e.id == id)
    }

    /// Number of active alarms. The vendor sends `{}` when there are none.
    pub fn alarm_count(&self) -> usize {
        match &self.alarms {
            Value::Object(map) => map.len(),
            Value::Array(list) => list.len(),
            _ => 0,
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Accept a JSON number, a numeric string, or null.
///
/// `weatherTemp` arrives as `"-6.78999999999996"` on some firmware.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got {s:?}"))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a number, got {other}"
        ))),
    }
}
