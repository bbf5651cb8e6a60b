// Water heater view for non-room envs (hot-water boilers, circuits).
//
// An env with no target is off. Turning it back on restores the last
// target this view has seen.

use serde_json::{Map, Value};

use myheat_api::Env;

use super::{
    EntityDescription, EntityView, Naming, Platform, Record, StateValue, TargetMemory, attributes,
    current_env, resume_target, validate_temperature, write_env_goal,
};
use crate::coordinator::Coordinator;
use crate::error::CoreError;
use crate::store::Snapshot;

pub const MIN_TEMP: f64 = 7.0;
pub const MAX_TEMP: f64 = 85.0;
pub const TEMP_STEP: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum OperationMode {
    On,
    Off,
}

pub struct WaterHeater {
    description: EntityDescription,
    env_id: i64,
    coordinator: Coordinator,
    memory: TargetMemory,
}

impl WaterHeater {
    pub(crate) fn new(naming: &Naming, env: &Env, coordinator: Coordinator) -> Self {
        let description = naming.whole_record(Record::Env(env), Platform::WaterHeater);
        Self {
            description,
            env_id: env.id,
            coordinator,
            memory: TargetMemory::new(env.target),
        }
    }

    pub fn env_id(&self) -> i64 {
        self.env_id
    }

    pub fn current_operation(&self, snapshot: Option<&Snapshot>) -> Option<OperationMode> {
        let env = current_env(snapshot, self.env_id)?;
        Some(match self.memory.observe(Some(env)) {
            Some(_) => OperationMode::On,
            None => OperationMode::Off,
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub async fn turn_on(&self) -> Result<(), CoreError> {
        let goal = resume_target(&self.coordinator, &self.memory, self.env_id)?;
        write_env_goal(&self.coordinator, self.env_id, Some(goal)).await
    }

    pub async fn turn_off(&self) -> Result<(), CoreError> {
        write_env_goal(&self.coordinator, self.env_id, None).await
    }

    pub async fn set_temperature(&self, temperature: f64) -> Result<(), CoreError> {
        validate_temperature(temperature, MIN_TEMP, MAX_TEMP)?;
        write_env_goal(&self.coordinator, self.env_id, Some(temperature)).await
    }

    pub async fn set_operation_mode(&self, mode: OperationMode) -> Result<(), CoreError> {
        match mode {
            OperationMode::On => self.turn_on().await,
            OperationMode::Off => self.turn_off().await,
        }
    }
}

impl EntityView for WaterHeater {
    fn description(&self) -> &EntityDescription {
        &self.description
    }

    fn state(&self, snapshot: Option<&Snapshot>) -> StateValue {
        self.current_operation(snapshot)
            .map_or(StateValue::Unknown, |mode| StateValue::Text(mode.to_string()))
    }

    fn attributes(&self, snapshot: Option<&Snapshot>) -> Map<String, Value> {
        let env = current_env(snapshot, self.env_id);
        let target = self.memory.observe(env);
        attributes([
            ("current_temperature", env.and_then(|e| e.value).map_or(Value::Null, Value::from)),
            ("target_temperature", Value::from(target.unwrap_or(0.0))),
            ("is_burning", Value::from(env.is_some_and(|e| e.demand))),
            ("min_temp", Value::from(MIN_TEMP)),
            ("max_temp", Value::from(MAX_TEMP)),
            ("target_temp_step", Value::from(TEMP_STEP)),
            (
                "operation_list",
                Value::from(vec![OperationMode::Off.to_string(), OperationMode::On.to_string()]),
            ),
        ])
    }
}
