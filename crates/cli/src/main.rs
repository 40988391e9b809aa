//! # Group Broadcaster CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - 会话连接 / 断开
//! - 交互菜单与一次性广播
//! - Ctrl+C 优雅取消

mod cli;
mod commands;
mod error;
mod report;
mod session;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tokio_util::sync::CancellationToken;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_list, run_menu, run_send, run_validate};
use session::{spawn_shutdown_listener, Session};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Group Broadcaster CLI starting"
    );

    let result = match &cli.command {
        Commands::Validate(args) => run_validate(&cli, args),
        command => run_connected(&cli, command).await.map_err(anyhow::Error::from),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Commands that need a live session; the session is closed on every path
async fn run_connected(cli: &Cli, command: &Commands) -> error::Result<()> {
    let cancel = CancellationToken::new();
    spawn_shutdown_listener(cancel.clone());

    let session = Session::open(cli, cancel).await?;
    let result = match command {
        Commands::List(args) => run_list(&session, args).await,
        Commands::Send(args) => run_send(&session, args).await,
        Commands::Menu => run_menu(&session).await,
        Commands::Validate(_) => Ok(()),
    };
    session.close().await;
    result
}

/// Initialize logging and metrics based on CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: (cli.metrics_port != 0).then_some(cli.metrics_port),
        default_log_level: default_log_level.to_string(),
    })
}
