//! Security alarm command handler.

use myheat_core::{Command as CoreCommand, EntryConfig};

use crate::cli::{GlobalOpts, SecurityArgs, SecurityCommand};
use crate::error::CliError;

use super::util;

pub async fn handle(
    config: EntryConfig,
    args: SecurityArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (mode, done) = match args.command {
        SecurityCommand::On => (true, "Security alarm armed"),
        SecurityCommand::Off => (false, "Security alarm disarmed"),
    };
    util::run_write(
        config,
        CoreCommand::SetSecurityMode {
            mode,
            device_id: None,
        },
        global,
        done,
    )
    .await
}
