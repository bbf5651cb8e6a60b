//! Environment command handlers.

use myheat_core::{Command as CoreCommand, EntryConfig};

use crate::cli::{EnvArgs, EnvCommand, GlobalOpts};
use crate::error::CliError;

use super::util;

pub async fn handle(config: EntryConfig, args: EnvArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        EnvCommand::Goal {
            obj_id,
            goal,
            off,
            change_mode,
        } => {
            let goal = if off { None } else { goal };
            let done = match goal {
                Some(goal) => format!("Environment {obj_id} target set to {goal}"),
                None => format!("Environment {obj_id} switched off"),
            };
            util::run_write(
                config,
                CoreCommand::SetEnvGoal {
                    obj_id,
                    goal,
                    change_mode,
                    device_id: None,
                },
                global,
                &done,
            )
            .await
        }

        EnvCommand::Curve {
            obj_id,
            curve,
            change_mode,
        } => {
            util::run_write(
                config,
                CoreCommand::SetEnvCurve {
                    obj_id,
                    curve,
                    change_mode,
                    device_id: None,
                },
                global,
                &format!("Environment {obj_id} curve set to {curve}"),
            )
            .await
        }
    }
}
