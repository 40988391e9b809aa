//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use contracts::DestinationId;
use std::path::PathBuf;

/// Group Broadcaster - send one message to every group the account can post in
#[derive(Parser, Debug)]
#[command(
    name = "group-broadcaster",
    author,
    version,
    about = "Rate-aware multi-group message broadcaster",
    long_about = "Broadcasts a message to every group and supergroup reachable through a chat account.\n\n\
                  Honours provider rate limits with a global cooldown and a single retry, \n\
                  repeats the pass for several rounds and reports aggregate results."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "GROUP_BROADCASTER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "GROUP_BROADCASTER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Path to the broadcast profile (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "broadcast.toml",
        global = true,
        env = "GROUP_BROADCASTER_CONFIG"
    )]
    pub config: PathBuf,

    /// Chat provider fixture (dialogs and scripted send results)
    #[arg(long, global = true, env = "GROUP_BROADCASTER_FIXTURE")]
    pub fixture: Option<PathBuf>,

    /// Metrics server port (0 = disabled)
    #[arg(
        long,
        default_value = "0",
        global = true,
        env = "GROUP_BROADCASTER_METRICS_PORT"
    )]
    pub metrics_port: u16,

    #[command(flatten)]
    pub account: AccountOverrides,

    #[command(subcommand)]
    pub command: Commands,
}

/// Account values that override the profile
#[derive(Args, Debug, Clone, Default)]
pub struct AccountOverrides {
    /// Override account.api_id
    #[arg(long, global = true, env = "GROUP_BROADCASTER_API_ID")]
    pub api_id: Option<i32>,

    /// Override account.api_hash
    #[arg(long, global = true, env = "GROUP_BROADCASTER_API_HASH", hide_env_values = true)]
    pub api_hash: Option<String>,

    /// Override account.phone_number
    #[arg(long, global = true, env = "GROUP_BROADCASTER_PHONE")]
    pub phone: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every destination the account can broadcast to
    List(ListArgs),

    /// Broadcast a message
    Send(SendArgs),

    /// Interactive menu
    Menu,

    /// Validate the profile without connecting
    Validate(ValidateArgs),
}

/// Arguments for the `list` command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `send` command
#[derive(Parser, Debug, Clone)]
pub struct SendArgs {
    /// Message text (defaults to broadcast.message from the profile)
    #[arg(short, long)]
    pub message: Option<String>,

    /// Number of full passes
    #[arg(short, long)]
    pub rounds: Option<u32>,

    /// Seconds to wait between rounds
    #[arg(short, long)]
    pub delay: Option<u64>,

    /// Destination id to skip (repeatable)
    #[arg(short = 'x', long = "exclude", allow_negative_numbers = true)]
    pub exclude: Vec<DestinationId>,

    /// Resolve and filter destinations, then exit without sending
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
