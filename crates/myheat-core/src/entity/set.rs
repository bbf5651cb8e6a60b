use strum::IntoEnumIterator;

use super::{
    DeviceBinarySensor, DeviceIndicator, EntityView, HeaterMetric, HeaterSensor, Naming, Record,
    RecordBinarySensor, RecordIndicator, SecuritySwitch, WaterHeater, WeatherSensor,
    climate::Climate,
};
use crate::coordinator::Coordinator;
use crate::store::Snapshot;

/// Every entity of one entry, discovered from its first snapshot.
pub struct EntitySet {
    weather: WeatherSensor,
    heater_sensors: Vec<HeaterSensor>,
    device_indicators: Vec<DeviceBinarySensor>,
    record_indicators: Vec<RecordBinarySensor>,
    security: SecuritySwitch,
    water_heaters: Vec<WaterHeater>,
    climates: Vec<Climate>,
}

impl EntitySet {
    /// Build the views for every record present in `snapshot`.
    ///
    /// Records that appear in later snapshots get no view until the entry
    /// is set up again.
    pub fn discover(
        entry_name: &str,
        entry_id: &str,
        coordinator: &Coordinator,
        snapshot: &Snapshot,
    ) -> Self {
        let naming = &Naming::new(entry_name, entry_id);
        let info = snapshot.info();

        let heater_sensors = info
            .heaters
            .iter()
            .flat_map(|heater| {
                HeaterMetric::iter().map(move |metric| HeaterSensor::new(naming, heater, metric))
            })
            .collect();

        let device_indicators = [
            DeviceIndicator::Severity,
            DeviceIndicator::DataActual,
            DeviceIndicator::Alarms,
        ]
        .into_iter()
        .map(|indicator| DeviceBinarySensor::new(naming, indicator))
        .collect();

        let heater_indicators = info.heaters.iter().flat_map(|heater| {
            [
                RecordIndicator::Disabled,
                RecordIndicator::BurnerWater,
                RecordIndicator::BurnerHeating,
            ]
            .map(|indicator| RecordBinarySensor::new(naming, Record::Heater(heater), indicator))
        });
        let env_indicators = info.envs.iter().map(|env| {
            RecordBinarySensor::new(naming, Record::Env(env), RecordIndicator::Severity)
        });
        let eng_indicators = info.engs.iter().flat_map(|eng| {
            [RecordIndicator::TurnedOn, RecordIndicator::Severity]
                .map(|indicator| RecordBinarySensor::new(naming, Record::Eng(eng), indicator))
        });
        let record_indicators = heater_indicators
            .chain(env_indicators)
            .chain(eng_indicators)
            .collect();

        let (rooms, others): (Vec<_>, Vec<_>) = info.envs.iter().partition(|env| env.is_room());
        let water_heaters = others
            .into_iter()
            .map(|env| WaterHeater::new(naming, env, coordinator.clone()))
            .collect();
        let climates = rooms
            .into_iter()
            .map(|env| Climate::new(naming, env, coordinator.clone()))
            .collect();

        Self {
            weather: WeatherSensor::new(naming),
            heater_sensors,
            device_indicators,
            record_indicators,
            security: SecuritySwitch::new(naming, coordinator.clone()),
            water_heaters,
            climates,
        }
    }

    // ── Lookup ───────────────────────────────────────────────────────

    /// All views: sensors, binary sensors, switch, water heaters, climates.
    pub fn views(&self) -> Vec<&dyn EntityView> {
        let mut views: Vec<&dyn EntityView> = Vec::with_capacity(self.len());
        views.push(&self.weather);
        views.extend(self.heater_sensors.iter().map(|v| v as &dyn EntityView));
        views.extend(self.device_indicators.iter().map(|v| v as &dyn EntityView));
        views.extend(self.record_indicators.iter().map(|v| v as &dyn EntityView));
        views.push(&self.security);
        views.extend(self.water_heaters.iter().map(|v| v as &dyn EntityView));
        views.extend(self.climates.iter().map(|v| v as &dyn EntityView));
        views
    }

    pub fn find(&self, unique_id: &str) -> Option<&dyn EntityView> {
        self.views()
            .into_iter()
            .find(|view| view.description().unique_id == unique_id)
    }

    /// Number of views. Never zero: the weather sensor and the security
    /// switch exist for every device.
    pub fn len(&self) -> usize {
        2 + self.heater_sensors.len()
            + self.device_indicators.len()
            + self.record_indicators.len()
            + self.water_heaters.len()
            + self.climates.len()
    }

    /// Always `false`, see [`len`](Self::len).
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn security(&self) -> &SecuritySwitch {
        &self.security
    }

    pub fn water_heater(&self, env_id: i64) -> Option<&WaterHeater> {
        self.water_heaters.iter().find(|w| w.env_id() == env_id)
    }

    pub fn water_heaters(&self) -> &[WaterHeater] {
        &self.water_heaters
    }

    pub fn climate(&self, env_id: i64) -> Option<&Climate> {
        self.climates.iter().find(|c| c.env_id() == env_id)
    }

    pub fn climates(&self) -> &[Climate] {
        &self.climates
    }
}
