// ── Configured entry ──
//
// One configured device: validated config, exactly one coordinator and
// the entities discovered from its first snapshot. Nothing is global; the
// host holds the `Entry` and drops it after `unload()`.

use std::sync::Once;

use tracing::{debug, info};

use myheat_api::MhClient;

use crate::command::{Command, CommandResult};
use crate::config::EntryConfig;
use crate::coordinator::Coordinator;
use crate::entity::EntitySet;
use crate::error::CoreError;

static BANNER: Once = Once::new();

pub struct Entry {
    id: String,
    config: EntryConfig,
    coordinator: Coordinator,
    entities: EntitySet,
}

impl Entry {
    /// Validate `config`, perform the first refresh and discover entities.
    ///
    /// Returns [`CoreError::NotReady`] when the first refresh fails; the
    /// host should call `setup` again later.
    pub async fn setup(config: EntryConfig) -> Result<Self, CoreError> {
        BANNER.call_once(|| {
            info!(
                version = env!("CARGO_PKG_VERSION"),
                "myheat starting; report issues at {}",
                env!("CARGO_PKG_REPOSITORY")
            );
        });

        config.validate()?;
        let client = MhClient::new(
            config.endpoint.clone(),
            config.credentials(),
            &config.transport(),
        )?;
        let coordinator = Coordinator::new(client, config.scan_interval);
        Self::with_coordinator(config, coordinator).await
    }

    /// Set up around an existing coordinator.
    pub async fn with_coordinator(
        config: EntryConfig,
        coordinator: Coordinator,
    ) -> Result<Self, CoreError> {
        coordinator.setup().await?;
        let snapshot = coordinator.snapshot().ok_or_else(|| {
            CoreError::Internal("coordinator ready without a snapshot".into())
        })?;

        let id = config.entry_id();
        let entities = EntitySet::discover(&config.name, &id, &coordinator, &snapshot);
        info!(entry = %id, entities = entities.len(), "entry set up");

        Ok(Self {
            id,
            config,
            coordinator,
            entities,
        })
    }

    /// Start periodic polling.
    pub async fn start(&self) {
        self.coordinator.start().await;
    }

    /// Stop polling. No further requests are made for this entry.
    pub async fn unload(self) {
        self.coordinator.shutdown().await;
        info!(entry = %self.id, "entry unloaded");
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &EntryConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn entities(&self) -> &EntitySet {
        &self.entities
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Run one host command.
    ///
    /// Writes against this entry's own device are followed by a forced
    /// refresh. Write errors are returned as-is.
    pub async fn execute(&self, command: Command) -> Result<CommandResult, CoreError> {
        debug!(?command, "executing command");
        let own_device = command
            .device_id()
            .is_none_or(|id| id == self.config.device_id);
        let refresh_after = command.is_write() && own_device;
        let client = self.coordinator.client();

        let result = match command {
            Command::GetDevices => CommandResult::Devices(client.get_devices().await?),
            Command::GetDeviceInfo { device_id } => {
                CommandResult::DeviceInfo(Box::new(client.get_device_info(device_id).await?))
            }
            Command::SetEnvGoal {
                obj_id,
                goal,
                change_mode,
                device_id,
            } => {
                client
                    .set_env_goal(obj_id, goal, device_id, change_mode)
                    .await?;
                CommandResult::Ok
            }
            Command::SetEnvCurve {
                obj_id,
                curve,
                change_mode,
                device_id,
            } => {
                client
                    .set_env_curve(obj_id, curve, device_id, change_mode)
                    .await?;
                CommandResult::Ok
            }
            Command::SetEngGoal {
                obj_id,
                goal,
                change_mode,
                device_id,
            } => {
                client
                    .set_eng_goal(obj_id, goal, device_id, change_mode)
                    .await?;
                CommandResult::Ok
            }
            Command::SetHeatingMode {
                mode_id,
                schedule_id,
                device_id,
            } => {
                client
                    .set_heating_mode(device_id, mode_id, schedule_id)
                    .await?;
                CommandResult::Ok
            }
            Command::SetSecurityMode { mode, device_id } => {
                if own_device {
                    // The switch refreshes on its own and keeps its assumed state.
                    self.entities.security().set(mode).await?;
                    return Ok(CommandResult::Ok);
                }
                client.set_security_mode(mode, device_id).await?;
                CommandResult::Ok
            }
            Command::Refresh => {
                CommandResult::Refreshed(self.coordinator.request_refresh().await)
            }
        };

        if refresh_after {
            self.coordinator.request_refresh().await;
        }
        Ok(result)
    }
}
