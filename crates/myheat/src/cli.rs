//! Clap derive structures for the `myheat` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// myheat -- control MyHeat heating controllers through the cloud API
#[derive(Debug, Parser)]
#[command(
    name = "myheat",
    version,
    about = "Control MyHeat heating controllers from the command line",
    long_about = "Reads device state and sends control commands through the\n\
        MyHeat cloud RPC endpoint (https://my.myheat.net/api/request/).",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Device profile to use
    #[arg(long, short = 'p', env = "MYHEAT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Device id (overrides profile)
    #[arg(long, short = 'd', env = "MYHEAT_DEVICE", global = true)]
    pub device: Option<i64>,

    /// MyHeat API key (overrides keyring and profile)
    #[arg(long, env = "MYHEAT_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "MYHEAT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "MYHEAT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "MYHEAT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List devices visible to the account
    #[command(alias = "dev")]
    Devices,

    /// Show the full state of a device
    Info,

    /// Control thermal environments (rooms, boilers, circuits)
    Env(EnvArgs),

    /// Control engineering components (pumps)
    Eng(EngArgs),

    /// Switch the heating mode or schedule
    HeatingMode(HeatingModeArgs),

    /// Arm or disarm the security alarm
    Security(SecurityArgs),

    /// Fetch the device state once and report the outcome
    Refresh,

    /// List entities with their current state
    #[command(alias = "ls")]
    Entities(EntitiesArgs),

    /// Poll the device and print a line per update
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Env ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EnvArgs {
    #[command(subcommand)]
    pub command: EnvCommand,
}

#[derive(Debug, Subcommand)]
pub enum EnvCommand {
    /// Set the target temperature of an environment
    Goal {
        /// Environment id
        obj_id: i64,

        /// Target temperature
        #[arg(required_unless_present = "off", allow_negative_numbers = true)]
        goal: Option<f64>,

        /// Switch the environment off instead
        #[arg(long, conflicts_with = "goal")]
        off: bool,

        /// Also leave the current heating mode
        #[arg(long)]
        change_mode: bool,
    },

    /// Select the heating curve of an environment
    Curve {
        /// Environment id
        obj_id: i64,

        /// Curve number
        curve: i64,

        /// Also leave the current heating mode
        #[arg(long)]
        change_mode: bool,
    },
}

// ── Eng ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EngArgs {
    #[command(subcommand)]
    pub command: EngCommand,
}

#[derive(Debug, Subcommand)]
pub enum EngCommand {
    /// Set the goal of an engineering component (1 = on, 0 = off for pumps)
    Goal {
        /// Component id
        obj_id: i64,

        /// Goal value
        goal: i64,

        /// Also leave the current heating mode
        #[arg(long)]
        change_mode: bool,
    },
}

// ── Heating mode ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .multiple(true)
        .args(["mode", "schedule"])
))]
pub struct HeatingModeArgs {
    /// Mode id (0 resets the mode; may be combined with --schedule)
    #[arg(long)]
    pub mode: Option<i64>,

    /// Schedule id
    #[arg(long)]
    pub schedule: Option<i64>,
}

// ── Security ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SecurityArgs {
    #[command(subcommand)]
    pub command: SecurityCommand,
}

#[derive(Debug, Subcommand)]
pub enum SecurityCommand {
    /// Arm the security alarm
    On,
    /// Disarm the security alarm
    Off,
}

// ── Entities & watch ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EntitiesArgs {
    /// Only show one platform (sensor, binary_sensor, switch, water_heater, climate)
    #[arg(long)]
    pub platform: Option<String>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Polling interval in seconds (overrides profile)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Stop after this many updates
    #[arg(long, short = 'n')]
    pub count: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup wizard with device discovery
    Init,

    /// Show the current configuration (API keys redacted)
    Show,

    /// Print the config file path
    Path,

    /// Store a profile's API key in the system keyring
    SetKey {
        /// Profile name (defaults to the active profile)
        profile: Option<String>,
    },

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
