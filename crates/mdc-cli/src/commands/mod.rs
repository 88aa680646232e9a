//! CLI command definitions and handlers.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use mdc_core::{Console, MdcConfig, Origin, StorageBackend};
use mdc_store::TabId;
use tracing::debug;

pub mod call;
pub mod crew;
pub mod log;
pub mod notify;
pub mod panic;
pub mod serve;
pub mod shift;
pub mod signal100;
pub mod watch;

/// Mobile Dispatch Console
#[derive(Parser)]
#[command(name = "mdc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to ./mdc.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve(serve::ServeArgs),

    /// Print every time a sync hook fires
    Watch(watch::WatchArgs),

    /// Ask a running server to announce an event
    Notify(notify::NotifyArgs),

    /// Crew management
    #[command(subcommand)]
    Crew(crew::CrewCommands),

    /// Call management
    #[command(subcommand)]
    Call(call::CallCommands),

    /// Signal 100 (all-units radio silence)
    #[command(subcommand)]
    Signal100(signal100::Signal100Commands),

    /// Crew panic alerts
    #[command(subcommand)]
    Panic(panic::PanicCommands),

    /// Work shift tracking
    #[command(subcommand)]
    Shift(shift::ShiftCommands),

    /// Show the activity log
    Log(log::LogArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => MdcConfig::from_file(path)?,
            None => MdcConfig::load()?,
        };

        match self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Watch(args) => watch::execute(args, config).await,
            Commands::Notify(args) => notify::execute(args, &config).await,
            Commands::Crew(cmd) => crew::execute(cmd, config).await,
            Commands::Call(cmd) => call::execute(cmd, config).await,
            Commands::Signal100(cmd) => signal100::execute(cmd, config).await,
            Commands::Panic(cmd) => panic::execute(cmd, config).await,
            Commands::Shift(cmd) => shift::execute(cmd, config).await,
            Commands::Log(args) => log::execute(args, config).await,
        }
    }
}

/// Join the configured origin as a fresh tab.
pub(crate) async fn open_console(config: MdcConfig) -> Result<Console> {
    if config.storage == StorageBackend::Memory {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            "memory storage is private to this process; set MDC_STORAGE=redis to share state".dimmed()
        );
    }
    let origin = Origin::open(config).await?;
    let console = origin.console(TabId::generate())?;
    debug!(tab = %console.tab(), "Console opened");
    Ok(console)
}

/// Give spawned publishes a moment to reach the transport before the
/// runtime shuts down.
pub(crate) async fn settle() {
    tokio::time::sleep(Duration::from_millis(200)).await;
}
