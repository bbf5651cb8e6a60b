// ── Command API ──
//
// Host-facing operations. Each variant maps to one RPC action, optionally
// against a device other than the entry's own.

use myheat_api::{DeviceInfo, DeviceSummary};

use crate::store::RefreshOutcome;

/// Every operation the host can ask an entry to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // ── Reads ────────────────────────────────────────────────────────
    GetDevices,
    GetDeviceInfo {
        device_id: Option<i64>,
    },

    // ── Writes ───────────────────────────────────────────────────────
    SetEnvGoal {
        obj_id: i64,
        /// `None` switches the env off.
        goal: Option<f64>,
        change_mode: bool,
        device_id: Option<i64>,
    },
    SetEnvCurve {
        obj_id: i64,
        curve: i64,
        change_mode: bool,
        device_id: Option<i64>,
    },
    SetEngGoal {
        obj_id: i64,
        goal: i64,
        change_mode: bool,
        device_id: Option<i64>,
    },
    SetHeatingMode {
        mode_id: Option<i64>,
        schedule_id: Option<i64>,
        device_id: Option<i64>,
    },
    SetSecurityMode {
        mode: bool,
        device_id: Option<i64>,
    },

    // ── Polling ──────────────────────────────────────────────────────
    Refresh,
}

impl Command {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Self::SetEnvGoal { .. }
                | Self::SetEnvCurve { .. }
                | Self::SetEngGoal { .. }
                | Self::SetHeatingMode { .. }
                | Self::SetSecurityMode { .. }
        )
    }

    /// The explicitly requested device, if any.
    pub fn device_id(&self) -> Option<i64> {
        match self {
            Self::GetDeviceInfo { device_id }
            | Self::SetEnvGoal { device_id, .. }
            | Self::SetEnvCurve { device_id, .. }
            | Self::SetEngGoal { device_id, .. }
            | Self::SetHeatingMode { device_id, .. }
            | Self::SetSecurityMode { device_id, .. } => *device_id,
            Self::GetDevices | Self::Refresh => None,
        }
    }
}

/// Result of a successfully executed [`Command`].
#[derive(Debug, Clone)]
pub enum CommandResult {
    /// Write accepted by the vendor.
    Ok,
    Devices(Vec<DeviceSummary>),
    DeviceInfo(Box<DeviceInfo>),
    Refreshed(RefreshOutcome),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_writes() {
        assert!(
            Command::SetSecurityMode {
                mode: true,
                device_id: None
            }
            .is_write()
        );
        assert!(!Command::GetDevices.is_write());
        assert!(!Command::Refresh.is_write());
    }

    #[test]
    fn exposes_alternate_device() {
        let cmd = Command::SetHeatingMode {
            mode_id: Some(2),
            schedule_id: None,
            device_id: Some(10),
        };
        assert_eq!(cmd.device_id(), Some(10));
        assert_eq!(Command::Refresh.device_id(), None);
    }
}
