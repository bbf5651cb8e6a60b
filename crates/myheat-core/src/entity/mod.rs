// ── Entity views ──
//
// Projections of the device snapshot into host-facing entities. Every view
// is a plain struct naming its record (category + id), the field it reads
// and its display metadata; records are found through `locate()`.

mod binary_sensor;
mod climate;
mod sensor;
mod set;
mod switch;
mod water_heater;

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::debug;

use myheat_api::{Eng, Env, Heater, SEVERITY_NORMAL};

use crate::coordinator::Coordinator;
use crate::error::CoreError;
use crate::store::Snapshot;

pub use binary_sensor::{DeviceBinarySensor, DeviceIndicator, RecordBinarySensor, RecordIndicator};
pub use climate::{Climate, HvacAction, HvacMode};
pub use sensor::{HeaterMetric, HeaterSensor, WeatherSensor};
pub use set::EntitySet;
pub use switch::SecuritySwitch;
pub use water_heater::{OperationMode, WaterHeater};

// ── Record location ──────────────────────────────────────────────────

/// Which list of the snapshot a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    Heater,
    Env,
    Eng,
}

/// A record borrowed from a snapshot.
#[derive(Debug, Clone, Copy)]
pub enum Record<'a> {
    Heater(&'a Heater),
    Env(&'a Env),
    Eng(&'a Eng),
}

impl<'a> Record<'a> {
    pub fn category(&self) -> Category {
        match self {
            Self::Heater(_) => Category::Heater,
            Self::Env(_) => Category::Env,
            Self::Eng(_) => Category::Eng,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::Heater(h) => h.id,
            Self::Env(e) => e.id,
            Self::Eng(e) => e.id,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            Self::Heater(h) => &h.name,
            Self::Env(e) => &e.name,
            Self::Eng(e) => &e.name,
        }
    }

    /// Severity code and description. Heaters carry none.
    pub fn severity(&self) -> (Option<i64>, Option<&'a str>) {
        match self {
            Self::Heater(_) => (None, None),
            Self::Env(e) => (e.severity, e.severity_desc.as_deref()),
            Self::Eng(e) => (e.severity, e.severity_desc.as_deref()),
        }
    }
}

/// Find the first record with `id` in the given category.
///
/// Returns `None` when the record is absent or the device reports its
/// data as stale (`dataActual == false`).
pub fn locate(snapshot: &Snapshot, category: Category, id: i64) -> Option<Record<'_>> {
    if !snapshot.data_actual() {
        return None;
    }
    match category {
        Category::Heater => snapshot.heater(id).map(Record::Heater),
        Category::Env => snapshot.env(id).map(Record::Env),
        Category::Eng => snapshot.eng(id).map(Record::Eng),
    }
}

// ── Descriptions ─────────────────────────────────────────────────────

/// Host platform an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Platform {
    Sensor,
    BinarySensor,
    Switch,
    WaterHeater,
    Climate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityCategory {
    Diagnostic,
}

/// Identity and display metadata of one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityDescription {
    pub unique_id: String,
    pub name: String,
    pub platform: Platform,
    pub device_class: Option<&'static str>,
    pub unit: Option<&'static str>,
    pub icon: Option<&'static str>,
    pub entity_category: Option<EntityCategory>,
}

impl EntityDescription {
    fn new(unique_id: String, name: String, platform: Platform) -> Self {
        Self {
            unique_id,
            name,
            platform,
            device_class: None,
            unit: None,
            icon: None,
            entity_category: None,
        }
    }

    fn device_class(mut self, device_class: &'static str) -> Self {
        self.device_class = Some(device_class);
        self
    }

    fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    fn icon(mut self, icon: &'static str) -> Self {
        self.icon = Some(icon);
        self
    }

    fn diagnostic(mut self) -> Self {
        self.entity_category = Some(EntityCategory::Diagnostic);
        self
    }
}

/// Builds names and unique ids for the entities of one entry.
#[derive(Debug, Clone)]
pub(crate) struct Naming {
    entry_name: String,
    entry_id: String,
}

impl Naming {
    pub(crate) fn new(entry_name: impl Into<String>, entry_id: impl Into<String>) -> Self {
        Self {
            entry_name: entry_name.into(),
            entry_id: entry_id.into(),
        }
    }

    /// Device-level entity, e.g. `Home weatherTemp` / `myheat-12weatherTemp`.
    fn device(&self, key: &str, platform: Platform) -> EntityDescription {
        EntityDescription::new(
            format!("{}{key}", self.entry_id),
            format!("{} {key}", self.entry_name),
            platform,
        )
    }

    /// Entity standing for a whole record, e.g. `Home Boiler`.
    fn whole_record(&self, record: Record<'_>, platform: Platform) -> EntityDescription {
        EntityDescription::new(
            format!("{}{}{}{platform}", self.entry_id, record.category(), record.id()),
            format!("{} {}", self.entry_name, record.name()),
            platform,
        )
    }

    /// Entity bound to one field of a record, e.g. `Home Boiler severity`.
    fn record(&self, record: Record<'_>, key: &str, platform: Platform) -> EntityDescription {
        EntityDescription::new(
            format!("{}{}{}{key}", self.entry_id, record.category(), record.id()),
            format!("{} {} {key}", self.entry_name, record.name()),
            platform,
        )
    }
}

// ── State values ─────────────────────────────────────────────────────

/// The state an entity reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StateValue {
    Unknown,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl StateValue {
    /// Binary reading; unknown reads as off.
    pub fn is_on(&self) -> bool {
        matches!(self, Self::Bool(true))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    fn number(value: Option<f64>) -> Self {
        value.map_or(Self::Unknown, Self::Number)
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::Bool(true) => f.write_str("on"),
            Self::Bool(false) => f.write_str("off"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Problem indicator: any code other than nominal is a problem.
pub fn severity_problem(code: Option<i64>) -> StateValue {
    code.map_or(StateValue::Unknown, |c| StateValue::Bool(c != SEVERITY_NORMAL))
}

fn severity_attributes(code: Option<i64>, description: Option<&str>) -> Map<String, Value> {
    attributes([
        ("value", code.map_or(Value::Null, Value::from)),
        ("description", description.map_or(Value::Null, Value::from)),
    ])
}

fn attributes<const N: usize>(pairs: [(&str, Value); N]) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value))
        .collect()
}

// ── View trait ───────────────────────────────────────────────────────

/// Read side shared by every entity.
pub trait EntityView: Send + Sync {
    fn description(&self) -> &EntityDescription;

    /// Current state given the latest snapshot (`None` before the first one).
    fn state(&self, snapshot: Option<&Snapshot>) -> StateValue;

    fn attributes(&self, _snapshot: Option<&Snapshot>) -> Map<String, Value> {
        Map::new()
    }
}

// ── Env goal writes ──────────────────────────────────────────────────

/// Last non-null target an env view has seen, used to switch it back on.
#[derive(Debug)]
pub(crate) struct TargetMemory {
    last: watch::Sender<Option<f64>>,
}

impl TargetMemory {
    pub(crate) fn new(initial: Option<f64>) -> Self {
        let (last, _) = watch::channel(initial);
        Self { last }
    }

    /// The env's target in this snapshot, remembering it when set.
    pub(crate) fn observe(&self, env: Option<&Env>) -> Option<f64> {
        let target = env.and_then(|e| e.target);
        if let Some(value) = target {
            self.last.send_if_modified(|last| {
                let changed = *last != Some(value);
                *last = Some(value);
                changed
            });
        }
        target
    }

    pub(crate) fn last(&self) -> Option<f64> {
        *self.last.borrow()
    }
}

fn current_env<'a>(snapshot: Option<&'a Snapshot>, env_id: i64) -> Option<&'a Env> {
    match locate(snapshot?, Category::Env, env_id)? {
        Record::Env(env) => Some(env),
        _ => None,
    }
}

/// Target to restore when switching an env on.
fn resume_target(
    coordinator: &Coordinator,
    memory: &TargetMemory,
    env_id: i64,
) -> Result<f64, CoreError> {
    let snapshot = coordinator.snapshot();
    memory
        .observe(current_env(snapshot.as_deref(), env_id))
        .or_else(|| memory.last())
        .ok_or_else(|| CoreError::ValidationFailed {
            message: format!("env {env_id} has no known target temperature; set one explicitly"),
        })
}

/// `setEnvGoal` for this entry's device, then a forced refresh.
async fn write_env_goal(
    coordinator: &Coordinator,
    env_id: i64,
    goal: Option<f64>,
) -> Result<(), CoreError> {
    coordinator
        .client()
        .set_env_goal(env_id, goal, None, false)
        .await?;
    debug!(env_id, ?goal, "env goal written");
    coordinator.request_refresh().await;
    Ok(())
}

fn validate_temperature(value: f64, min: f64, max: f64) -> Result<(), CoreError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::ValidationFailed {
            message: format!("temperature {value} outside {min}..={max}"),
        })
    }
}
