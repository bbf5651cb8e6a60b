//! Engineering component command handlers.

use myheat_core::{Command as CoreCommand, EntryConfig};

use crate::cli::{EngArgs, EngCommand, GlobalOpts};
use crate::error::CliError;

use super::util;

pub async fn handle(config: EntryConfig, args: EngArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        EngCommand::Goal {
            obj_id,
            goal,
            change_mode,
        } => {
            util::run_write(
                config,
                CoreCommand::SetEngGoal {
                    obj_id,
                    goal,
                    change_mode,
                    device_id: None,
                },
                global,
                &format!("Component {obj_id} goal set to {goal}"),
            )
            .await
        }
    }
}
