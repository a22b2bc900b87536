//! Clap derive structures for the `holewatch` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// holewatch -- wormhole kill watchlist and hub connection scout
#[derive(Debug, Parser)]
#[command(
    name = "holewatch",
    version,
    about = "Watch wormhole systems for new kills and hub connections",
    long_about = "Tracks a roster of wormhole systems, polls the killboard for new kills,\n\
        and reports watched systems, generic groups and special systems that\n\
        appear in the hub connection feed.",
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
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, short = 'c', env = "HOLEWATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Primary database (overrides [storage] database)
    #[arg(long, short = 'd', env = "HOLEWATCH_DATABASE", global = true)]
    pub database: Option<PathBuf>,

    /// Catalog JSON export (overrides [catalog] path)
    #[arg(long, env = "HOLEWATCH_CATALOG", global = true)]
    pub catalog: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HOLEWATCH_OUTPUT",
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

    /// Confirm destructive operations
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the check cycle until interrupted
    Run(RunArgs),

    /// Manage the wormhole watchlist
    #[command(alias = "wh", alias = "r")]
    Roster(RosterArgs),

    /// Manage generic wormhole groups
    #[command(alias = "generics", alias = "g")]
    Groups(GroupsArgs),

    /// Resolve a description against the catalog without saving it
    Search {
        /// Free-text description, e.g. "C3 HS"
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },

    /// Show a wormhole static
    Static {
        /// Static code, e.g. D845
        code: String,
    },

    /// Inspect configuration
    Config(ConfigArgs),
}

// ── Run ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Run a single check cycle and exit
    #[arg(long)]
    pub once: bool,
}

// ── Roster ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RosterArgs {
    #[command(subcommand)]
    pub command: RosterCommand,
}

#[derive(Debug, Subcommand)]
pub enum RosterCommand {
    /// Start tracking a system
    Add {
        /// System name, e.g. J123456
        name: String,

        /// Track without polling for kills
        #[arg(long)]
        unwatched: bool,

        /// Free-text comments; `<url|label>` links are supported
        #[arg(long, short = 'm', default_value = "")]
        comments: String,
    },

    /// Stop tracking a system
    #[command(alias = "rm")]
    Remove { name: String },

    /// Change watch status and (optionally) comments
    Edit {
        name: String,

        /// Poll this system for kills
        #[arg(long, action = clap::ArgAction::Set)]
        watched: bool,

        /// Replacement comments; omitted keeps the current ones
        #[arg(long, short = 'm', default_value = "")]
        comments: String,
    },

    /// List tracked systems
    #[command(alias = "ls")]
    List,

    /// Show one tracked system
    Show { name: String },

    /// Describe any system from the catalog
    Info { name: String },

    /// Remove every tracked system (requires --yes)
    Clear,
}

// ── Groups ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GroupsArgs {
    #[command(subcommand)]
    pub command: GroupsCommand,
}

#[derive(Debug, Subcommand)]
pub enum GroupsCommand {
    /// Create a group from a description
    Add {
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },

    /// Delete a group
    #[command(alias = "rm")]
    Remove { id: i64 },

    /// Replace a group's description
    Edit {
        id: i64,
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },

    /// List groups
    #[command(alias = "ls")]
    List,

    /// Show the systems a group resolves to
    Members { id: i64 },

    /// List groups containing a system
    Containing { name: String },

    /// Delete every group (requires --yes)
    Clear,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Print the default config file location
    Path,
}
