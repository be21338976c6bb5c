//! Clap derive structures for the `mwkit` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// mwkit -- inspect and manage a MetaWear device registry
#[derive(Debug, Parser)]
#[command(
    name = "mwkit",
    version,
    about = "Browse and manage MetaWear devices, groups and recorded sessions",
    long_about = "Loads a registry snapshot (devices, groups, sessions) from a JSON file,\n\
        resolves devices and groups the way the companion app does, and writes\n\
        mutations back to the same file.",
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
    /// Registry snapshot file (overrides config)
    #[arg(long, short = 'r', env = "MWKIT_REGISTRY", global = true)]
    pub registry: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "MWKIT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List known devices
    #[command(alias = "dev", alias = "d")]
    Devices,

    /// List device groups
    #[command(alias = "g")]
    Groups,

    /// List, rename or delete recorded sessions
    #[command(alias = "s")]
    Sessions(SessionsArgs),

    /// Show one device or group (ITEM is a MAC or group:<uuid>)
    Show(ItemArg),

    /// Show the per-device history rows for an item
    History(ItemArg),

    /// Rename a device or group
    Rename(RenameArgs),

    /// Create a group from devices and/or other groups
    Group(GroupArgs),

    /// Disband a group (its devices are kept)
    Disband(ItemArg),

    /// Forget a device or every device of a group
    Forget(ForgetArgs),

    /// Connect a device or every locally known device of a group
    Connect(ItemArg),

    /// Factory-reset one device
    Reset(MacArg),

    /// Start logging on a device or group
    Log(LogArgs),

    /// Export a recorded session to CSV
    Download(DownloadArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Arguments ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ItemArg {
    /// MAC address or group:<uuid>
    pub item: String,
}

#[derive(Debug, Args)]
pub struct MacArg {
    /// Device MAC address
    pub mac: String,
}

#[derive(Debug, Args)]
pub struct RenameArgs {
    /// MAC address or group:<uuid>
    pub item: String,
    /// New display name
    pub name: String,
}

#[derive(Debug, Args)]
pub struct GroupArgs {
    /// Name of the new group
    pub name: String,
    /// Members: MACs or group:<uuid> (groups are flattened)
    #[arg(required = true, num_args = 1..)]
    pub items: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ForgetArgs {
    /// MAC address or group:<uuid>
    pub item: String,
    /// Remove from the cloud too, not just this host
    #[arg(long, short = 'e')]
    pub everywhere: bool,
}

#[derive(Debug, Args)]
pub struct LogArgs {
    /// MAC address or group:<uuid>
    pub item: String,
    /// Sensor to enable, optionally with a rate: accelerometer or gyroscope@50
    #[arg(long = "sensor", short = 's', required = true)]
    pub sensors: Vec<String>,
}

#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Session UUID
    pub session: String,
    /// Directory to write the CSV into
    #[arg(long, short = 'd', default_value = ".")]
    pub dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct SessionsArgs {
    #[command(subcommand)]
    pub command: Option<SessionsCommand>,
}

#[derive(Debug, Subcommand)]
pub enum SessionsCommand {
    /// List sessions, newest first (default)
    List,
    /// Rename a session
    Rename {
        /// Session UUID
        id: String,
        /// New name
        name: String,
    },
    /// Delete a session and its data
    Delete {
        /// Session UUID
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,
    /// Show the effective configuration
    Show,
    /// Set a config value (registry_path, action_queue_capacity, log_level)
    Set {
        key: String,
        value: String,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
