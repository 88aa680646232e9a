//! Poke a running server.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mdc_core::{MdcConfig, WebNotifier};
use mdc_sync::SyncEvent;

#[derive(Args)]
pub struct NotifyArgs {
    /// Event name, e.g. calls_updated
    pub event: String,

    /// Server URL (defaults to the configured web URL)
    #[arg(long)]
    pub url: Option<String>,
}

pub async fn execute(args: NotifyArgs, config: &MdcConfig) -> Result<()> {
    let event: SyncEvent = args.event.parse()?;
    let url = args.url.unwrap_or_else(|| config.web_url());
    let notifier = WebNotifier::new(&url);

    if notifier.notify(event, None).await {
        println!("{} Announced {}", "✓".green().bold(), event.as_str().cyan());
        Ok(())
    } else {
        anyhow::bail!("No server accepted the notification at {}", notifier.base_url())
    }
}
