// Climate view for room envs.

use serde_json::{Map, Value};

use myheat_api::Env;

use super::{
    EntityDescription, EntityView, Naming, Platform, Record, StateValue, TargetMemory, attributes,
    current_env, resume_target, validate_temperature, write_env_goal,
};
use crate::coordinator::Coordinator;
use crate::error::CoreError;
use crate::store::Snapshot;

pub const MIN_TEMP: f64 = 5.0;
pub const MAX_TEMP: f64 = 35.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum HvacMode {
    Heat,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum HvacAction {
    Heating,
    Idle,
    Off,
}

pub struct Climate {
    description: EntityDescription,
    env_id: i64,
    coordinator: Coordinator,
    memory: TargetMemory,
}

impl Climate {
    pub(crate) fn new(naming: &Naming, env: &Env, coordinator: Coordinator) -> Self {
        let description = naming.whole_record(Record::Env(env), Platform::Climate);
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

    pub fn hvac_mode(&self, snapshot: Option<&Snapshot>) -> Option<HvacMode> {
        let env = current_env(snapshot, self.env_id)?;
        Some(match self.memory.observe(Some(env)) {
            Some(_) => HvacMode::Heat,
            None => HvacMode::Off,
        })
    }

    /// Whether the room is currently calling for heat.
    pub fn hvac_action(&self, snapshot: Option<&Snapshot>) -> Option<HvacAction> {
        let env = current_env(snapshot, self.env_id)?;
        Some(match (env.target, env.demand) {
            (None, _) => HvacAction::Off,
            (Some(_), true) => HvacAction::Heating,
            (Some(_), false) => HvacAction::Idle,
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub async fn set_temperature(&self, temperature: f64) -> Result<(), CoreError> {
        validate_temperature(temperature, MIN_TEMP, MAX_TEMP)?;
        write_env_goal(&self.coordinator, self.env_id, Some(temperature)).await
    }

    pub async fn set_hvac_mode(&self, mode: HvacMode) -> Result<(), CoreError> {
        let goal = match mode {
            HvacMode::Heat => Some(resume_target(&self.coordinator, &self.memory, self.env_id)?),
            HvacMode::Off => None,
        };
        write_env_goal(&self.coordinator, self.env_id, goal).await
    }
}

impl EntityView for Climate {
    fn description(&self) -> &EntityDescription {
        &self.description
    }

    fn state(&self, snapshot: Option<&Snapshot>) -> StateValue {
        self.hvac_mode(snapshot)
            .map_or(StateValue::Unknown, |mode| StateValue::Text(mode.to_string()))
    }

    fn attributes(&self, snapshot: Option<&Snapshot>) -> Map<String, Value> {
        let env = current_env(snapshot, self.env_id);
        attributes([
            ("current_temperature", env.and_then(|e| e.value).map_or(Value::Null, Value::from)),
            ("target_temperature", env.and_then(|e| e.target).map_or(Value::Null, Value::from)),
            (
                "hvac_action",
                self.hvac_action(snapshot)
                    .map_or(Value::Null, |a| Value::from(a.to_string())),
            ),
            ("min_temp", Value::from(MIN_TEMP)),
            ("max_temp", Value::from(MAX_TEMP)),
        ])
    }
}
