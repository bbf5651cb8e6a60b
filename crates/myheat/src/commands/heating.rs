//! Heating mode command handler.

use myheat_core::{Command as CoreCommand, EntryConfig};

use crate::cli::{GlobalOpts, HeatingModeArgs};
use crate::error::CliError;

use super::util;

pub async fn handle(
    config: EntryConfig,
    args: HeatingModeArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let done = match (args.mode, args.schedule) {
        (Some(0), _) => "Heating mode reset".to_owned(),
        (Some(mode), _) => format!("Heating mode set to {mode}"),
        (None, Some(schedule)) => format!("Heating schedule set to {schedule}"),
        (None, None) => "Heating mode unchanged".to_owned(),
    };
    util::run_write(
        config,
        CoreCommand::SetHeatingMode {
            mode_id: args.mode,
            schedule_id: args.schedule,
            device_id: None,
        },
        global,
        &done,
    )
    .await
}
