use tokio::sync::watch;
use tracing::info;

use super::{EntityDescription, EntityView, Naming, Platform, StateValue};
use crate::coordinator::Coordinator;
use crate::error::CoreError;
use crate::store::Snapshot;

/// Arms and disarms the device's security mode.
///
/// The API has no read-back for security mode, so the switch reports the
/// state it last set successfully. The refresh that follows a toggle
/// leaves that state alone.
pub struct SecuritySwitch {
    description: EntityDescription,
    coordinator: Coordinator,
    assumed: watch::Sender<Option<bool>>,
}

impl SecuritySwitch {
    pub(crate) fn new(naming: &Naming, coordinator: Coordinator) -> Self {
        let description = EntityDescription::new(
            format!("{}security", naming.entry_id),
            format!("{} security alarm", naming.entry_name),
            Platform::Switch,
        );
        let (assumed, _) = watch::channel(None);
        Self {
            description: description.icon("mdi:security"),
            coordinator,
            assumed,
        }
    }

    pub async fn turn_on(&self) -> Result<(), CoreError> {
        self.set(true).await
    }

    pub async fn turn_off(&self) -> Result<(), CoreError> {
        self.set(false).await
    }

    pub async fn set(&self, armed: bool) -> Result<(), CoreError> {
        self.coordinator
            .client()
            .set_security_mode(armed, None)
            .await?;
        self.assumed.send_replace(Some(armed));
        info!(armed, "security mode set");
        self.coordinator.request_refresh().await;
        Ok(())
    }

    /// Last state set through this switch, if any.
    pub fn is_on(&self) -> Option<bool> {
        *self.assumed.borrow()
    }
}

impl EntityView for SecuritySwitch {
    fn description(&self) -> &EntityDescription {
        &self.description
    }

    fn state(&self, _snapshot: Option<&Snapshot>) -> StateValue {
        self.is_on().map_or(StateValue::Unknown, StateValue::Bool)
    }
}
