use serde_json::{Map, Value};

use myheat_api::Heater;

use super::{
    Category, EntityDescription, EntityView, Naming, Platform, Record, StateValue, attributes,
    locate,
};
use crate::store::Snapshot;

// ── Weather ──────────────────────────────────────────────────────────

/// Outdoor temperature reported for the device's city.
#[derive(Debug, Clone)]
pub struct WeatherSensor {
    description: EntityDescription,
}

impl WeatherSensor {
    pub(crate) fn new(naming: &Naming) -> Self {
        Self {
            description: naming
                .device("weatherTemp", Platform::Sensor)
                .device_class("temperature")
                .unit("°C"),
        }
    }
}

impl EntityView for WeatherSensor {
    fn description(&self) -> &EntityDescription {
        &self.description
    }

    fn state(&self, snapshot: Option<&Snapshot>) -> StateValue {
        StateValue::number(snapshot.and_then(|s| s.info().weather_temp))
    }

    fn attributes(&self, snapshot: Option<&Snapshot>) -> Map<String, Value> {
        let city = snapshot
            .and_then(|s| s.info().city.clone())
            .map_or(Value::Null, Value::from);
        attributes([("city", city)])
    }
}

// ── Heater metrics ───────────────────────────────────────────────────

/// Numeric heater readings exposed as sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumIter)]
pub enum HeaterMetric {
    FlowTemp,
    ReturnTemp,
    TargetTemp,
    Pressure,
    Modulation,
}

impl HeaterMetric {
    /// Wire key, also used in entity names.
    pub fn key(self) -> &'static str {
        match self {
            Self::FlowTemp => "flowTemp",
            Self::ReturnTemp => "returnTemp",
            Self::TargetTemp => "targetTemp",
            Self::Pressure => "pressure",
            Self::Modulation => "modulation",
        }
    }

    pub fn read(self, heater: &Heater) -> Option<f64> {
        match self {
            Self::FlowTemp => heater.flow_temp,
            Self::ReturnTemp => heater.return_temp,
            Self::TargetTemp => heater.target_temp,
            Self::Pressure => heater.pressure,
            Self::Modulation => heater.modulation,
        }
    }

    fn describe(self, description: EntityDescription) -> EntityDescription {
        match self {
            Self::FlowTemp | Self::ReturnTemp | Self::TargetTemp => description
                .icon("mdi:coolant-temperature")
                .device_class("temperature")
                .unit("°C"),
            Self::Pressure => description
                .icon("mdi:gauge")
                .device_class("pressure")
                .unit("bar"),
            Self::Modulation => description.icon("mdi:gas-burner").unit("%"),
        }
    }
}

/// One numeric reading of one heater.
#[derive(Debug, Clone)]
pub struct HeaterSensor {
    description: EntityDescription,
    heater_id: i64,
    metric: HeaterMetric,
}

impl HeaterSensor {
    pub(crate) fn new(naming: &Naming, heater: &Heater, metric: HeaterMetric) -> Self {
        let description = naming.record(Record::Heater(heater), metric.key(), Platform::Sensor);
        Self {
            description: metric.describe(description),
            heater_id: heater.id,
            metric,
        }
    }

    pub fn heater_id(&self) -> i64 {
        self.heater_id
    }

    pub fn metric(&self) -> HeaterMetric {
        self.metric
    }
}

impl EntityView for HeaterSensor {
    fn description(&self) -> &EntityDescription {
        &self.description
    }

    fn state(&self, snapshot: Option<&Snapshot>) -> StateValue {
        let value = snapshot
            .and_then(|s| locate(s, Category::Heater, self.heater_id))
            .and_then(|record| match record {
                Record::Heater(heater) => self.metric.read(heater),
                _ => None,
            });
        StateValue::number(value)
    }
}
