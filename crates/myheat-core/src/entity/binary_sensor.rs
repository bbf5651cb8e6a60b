use serde_json::{Map, Value};

use super::{
    Category, EntityDescription, EntityView, Naming, Platform, Record, StateValue, attributes,
    locate, severity_attributes, severity_problem,
};
use crate::store::Snapshot;

// ── Device-level indicators ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceIndicator {
    /// Overall device health.
    Severity,
    /// Vendor freshness flag.
    DataActual,
    /// Any active alarm.
    Alarms,
}

impl DeviceIndicator {
    fn key(self) -> &'static str {
        match self {
            Self::Severity => "severity",
            Self::DataActual => "dataActual",
            Self::Alarms => "alarms",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeviceBinarySensor {
    description: EntityDescription,
    indicator: DeviceIndicator,
}

impl DeviceBinarySensor {
    pub(crate) fn new(naming: &Naming, indicator: DeviceIndicator) -> Self {
        let description = naming.device(indicator.key(), Platform::BinarySensor);
        let description = match indicator {
            DeviceIndicator::Severity => description
                .device_class("problem")
                .icon("mdi:water-boiler-alert")
                .diagnostic(),
            DeviceIndicator::DataActual => description.device_class("connectivity").diagnostic(),
            DeviceIndicator::Alarms => description.device_class("tamper"),
        };
        Self {
            description,
            indicator,
        }
    }

    pub fn indicator(&self) -> DeviceIndicator {
        self.indicator
    }
}

impl EntityView for DeviceBinarySensor {
    fn description(&self) -> &EntityDescription {
        &self.description
    }

    fn state(&self, snapshot: Option<&Snapshot>) -> StateValue {
        let Some(info) = snapshot.map(Snapshot::info) else {
            return StateValue::Unknown;
        };
        match self.indicator {
            DeviceIndicator::Severity => severity_problem(info.severity),
            DeviceIndicator::DataActual => StateValue::Bool(info.data_actual),
            DeviceIndicator::Alarms => StateValue::Bool(info.alarm_count() > 0),
        }
    }

    fn attributes(&self, snapshot: Option<&Snapshot>) -> Map<String, Value> {
        let info = snapshot.map(Snapshot::info);
        match self.indicator {
            DeviceIndicator::Severity => severity_attributes(
                info.and_then(|i| i.severity),
                info.and_then(|i| i.severity_desc.as_deref()),
            ),
            DeviceIndicator::Alarms => attributes([(
                "alarms",
                info.map_or(Value::Null, |i| i.alarms.clone()),
            )]),
            DeviceIndicator::DataActual => Map::new(),
        }
    }
}

// ── Record indicators ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordIndicator {
    /// Heater switched off.
    Disabled,
    /// Heater burner heating hot water.
    BurnerWater,
    /// Heater burner heating the circuit.
    BurnerHeating,
    /// Env or eng health.
    Severity,
    /// Eng running.
    TurnedOn,
}

impl RecordIndicator {
    fn key(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::BurnerWater => "burnerWater",
            Self::BurnerHeating => "burnerHeating",
            Self::Severity => "severity",
            Self::TurnedOn => "turnedOn",
        }
    }

    fn read(self, record: Record<'_>) -> StateValue {
        match (self, record) {
            (Self::Disabled, Record::Heater(h)) => StateValue::Bool(h.disabled),
            (Self::BurnerWater, Record::Heater(h)) => StateValue::Bool(h.burner_water),
            (Self::BurnerHeating, Record::Heater(h)) => StateValue::Bool(h.burner_heating),
            (Self::TurnedOn, Record::Eng(e)) => StateValue::Bool(e.turned_on),
            (Self::Severity, record) => severity_problem(record.severity().0),
            _ => StateValue::Unknown,
        }
    }
}

/// Binary reading of one heater, env or eng.
#[derive(Debug, Clone)]
pub struct RecordBinarySensor {
    description: EntityDescription,
    category: Category,
    id: i64,
    indicator: RecordIndicator,
}

impl RecordBinarySensor {
    pub(crate) fn new(naming: &Naming, record: Record<'_>, indicator: RecordIndicator) -> Self {
        let category = record.category();
        let description = naming.record(record, indicator.key(), Platform::BinarySensor);
        let description = match (indicator, category) {
            (RecordIndicator::Disabled, _) => description.icon("mdi:electric-switch"),
            (RecordIndicator::BurnerWater | RecordIndicator::BurnerHeating, _) => {
                description.icon("mdi:fire").device_class("heat")
            }
            (RecordIndicator::Severity, Category::Env) => description
                .device_class("problem")
                .icon("mdi:water-boiler-alert")
                .diagnostic(),
            (RecordIndicator::Severity, _) => description.device_class("problem").diagnostic(),
            (RecordIndicator::TurnedOn, _) => description,
        };
        Self {
            description,
            category,
            id: record.id(),
            indicator,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn record_id(&self) -> i64 {
        self.id
    }

    pub fn indicator(&self) -> RecordIndicator {
        self.indicator
    }
}

impl EntityView for RecordBinarySensor {
    fn description(&self) -> &EntityDescription {
        &self.description
    }

    fn state(&self, snapshot: Option<&Snapshot>) -> StateValue {
        snapshot
            .and_then(|s| locate(s, self.category, self.id))
            .map_or(StateValue::Unknown, |record| self.indicator.read(record))
    }

    fn attributes(&self, snapshot: Option<&Snapshot>) -> Map<String, Value> {
        if self.indicator != RecordIndicator::Severity {
            return Map::new();
        }
        let (code, description) = snapshot
            .and_then(|s| locate(s, self.category, self.id))
            .map_or((None, None), |record| record.severity());
        severity_attributes(code, description)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use myheat_api::DeviceInfo;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn snapshot(data: Value) -> Snapshot {
        Snapshot::new(DeviceInfo::from_data(data).unwrap())
    }

    fn naming() -> Naming {
        Naming::new("Home", "myheat-12")
    }

    #[test]
    fn device_severity_and_alarms() {
        let snap = snapshot(json!({
            "severity": 2, "severityDesc": "warning",
            "alarms": {"7": "overheat"}, "dataActual": true
        }));

        let severity = DeviceBinarySensor::new(&naming(), DeviceIndicator::Severity);
        assert!(severity.state(Some(&snap)).is_on());
        assert_eq!(
            Value::Object(severity.attributes(Some(&snap))),
            json!({"value": 2, "description": "warning"})
        );

        let alarms = DeviceBinarySensor::new(&naming(), DeviceIndicator::Alarms);
        assert!(alarms.state(Some(&snap)).is_on());
        assert_eq!(alarms.attributes(Some(&snap))["alarms"], json!({"7": "overheat"}));
        assert_eq!(alarms.description().device_class, Some("tamper"));
    }

    #[test]
    fn data_actual_reports_freshness_even_when_stale() {
        let snap = snapshot(json!({"dataActual": false}));
        let sensor = DeviceBinarySensor::new(&naming(), DeviceIndicator::DataActual);
        assert_eq!(sensor.state(Some(&snap)), StateValue::Bool(false));
        assert_eq!(sensor.state(None), StateValue::Unknown);
    }

    #[test]
    fn burner_of_missing_heater_is_unknown() {
        let with_heater = snapshot(json!({
            "heaters": [{"id": 13, "name": "Vaillant", "burnerWater": true}],
            "dataActual": true
        }));
        let heater = with_heater.heater(13).unwrap().clone();
        let sensor = RecordBinarySensor::new(&naming(), Record::Heater(&heater), RecordIndicator::BurnerWater);
        assert_eq!(sensor.state(Some(&with_heater)), StateValue::Bool(true));

        let without = snapshot(json!({"heaters": [], "dataActual": true}));
        let state = sensor.state(Some(&without));
        assert!(state.is_unknown());
        assert!(!state.is_on());
    }

    #[test]
    fn eng_severity_with_missing_code_is_unknown() {
        let snap = snapshot(json!({
            "engs": [{"id": 40, "name": "Pump", "turnedOn": true}],
            "dataActual": true
        }));
        let eng = snap.eng(40).unwrap().clone();

        let severity = RecordBinarySensor::new(&naming(), Record::Eng(&eng), RecordIndicator::Severity);
        assert_eq!(severity.state(Some(&snap)), StateValue::Unknown);
        assert_eq!(
            Value::Object(severity.attributes(Some(&snap))),
            json!({"value": null, "description": null})
        );

        let turned_on = RecordBinarySensor::new(&naming(), Record::Eng(&eng), RecordIndicator::TurnedOn);
        assert!(turned_on.state(Some(&snap)).is_on());
    }
}
