//! Web server command.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mdc_core::{MdcConfig, Origin};

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on (defaults to the configured port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Host to bind to (defaults to the configured host)
    #[arg(long)]
    pub host: Option<String>,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file used with --log
    #[arg(long, default_value = "mdc-serve.log")]
    pub log_file: PathBuf,
}

pub async fn execute(args: ServeArgs, config: MdcConfig) -> Result<()> {
    let host = args.host.unwrap_or_else(|| config.web_host.clone());
    let port = args.port.unwrap_or(config.web_port);
    let backend = format!("{:?}", config.storage).to_lowercase();

    let origin = Origin::open(config).await?;

    println!();
    println!("  {} {}", "MDC".cyan().bold(), "Dispatch Console Server".bold());
    println!();
    println!("  {}        http://{}:{}/api", "API".green(), host, port);
    println!("  {}  ws://{}:{}/ws", "WebSocket".green(), host, port);
    println!("  {}    {}", "Storage".green(), backend);
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    mdc_web::run_server(origin, &host, port).await?;

    Ok(())
}
