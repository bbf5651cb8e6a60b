//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod eng;
pub mod entities;
pub mod env;
pub mod heating;
pub mod info;
pub mod refresh;
pub mod security;
pub mod util;
pub mod watch;

use myheat_core::EntryConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: EntryConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices => devices::handle(&config, global).await,
        Command::Info => info::handle(&config, global).await,
        Command::Env(args) => env::handle(config, args, global).await,
        Command::Eng(args) => eng::handle(config, args, global).await,
        Command::HeatingMode(args) => heating::handle(config, args, global).await,
        Command::Security(args) => security::handle(config, args, global).await,
        Command::Refresh => refresh::handle(&config, global).await,
        Command::Entities(args) => entities::handle(config, args, global).await,
        Command::Watch(args) => watch::handle(config, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
