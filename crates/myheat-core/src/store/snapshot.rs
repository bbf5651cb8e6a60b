use chrono::{DateTime, Utc};
use serde_json::Value;

use myheat_api::{DeviceInfo, Eng, Env, Heater};

/// One successful `getDeviceInfo` result, immutable once published.
#[derive(Debug, Clone)]
pub struct Snapshot {
    info: DeviceInfo,
    fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(info: DeviceInfo) -> Self {
        Self {
            info,
            fetched_at: Utc::now(),
        }
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    /// The `data` payload exactly as received.
    pub fn data(&self) -> &Value {
        self.info.raw()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Whether the vendor considers the readings current.
    pub fn data_actual(&self) -> bool {
        self.info.data_actual
    }

    pub fn heater(&self, id: i64) -> Option<&Heater> {
        self.info.heater(id)
    }

    pub fn env(&self, id: i64) -> Option<&Env> {
        self.info.env(id)
    }

    pub fn eng(&self, id: i64) -> Option<&Eng> {
        self.info.eng(id)
    }
}
