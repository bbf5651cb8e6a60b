//! Shared helpers for command handlers.

use myheat_api::MhClient;
use myheat_core::{Command as CoreCommand, Entry, EntryConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// RPC client for one-shot reads that need no snapshot.
pub fn client(config: &EntryConfig) -> Result<MhClient, CliError> {
    config.validate()?;
    Ok(MhClient::new(
        config.endpoint.clone(),
        config.credentials(),
        &config.transport(),
    )?)
}

/// Set up an entry, run one write through it and unload it again.
///
/// The entry's forced refresh after the write is part of `execute`.
pub async fn run_write(
    config: EntryConfig,
    command: CoreCommand,
    global: &GlobalOpts,
    done: &str,
) -> Result<(), CliError> {
    let entry = Entry::setup(config).await?;
    let result = entry.execute(command).await;
    entry.unload().await;
    result?;

    if !global.quiet {
        eprintln!("✓ {done}");
    }
    Ok(())
}
