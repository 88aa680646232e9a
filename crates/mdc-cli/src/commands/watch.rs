//! Watch sync events the way a console view would.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mdc_core::MdcConfig;
use mdc_sync::{use_sync, SyncEvent};

use super::open_console;

#[derive(Args)]
pub struct WatchArgs {
    /// Events to watch (defaults to all)
    pub events: Vec<String>,

    /// Poll interval in milliseconds; 0 disables polling
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

pub async fn execute(args: WatchArgs, config: MdcConfig) -> Result<()> {
    let events = if args.events.is_empty() {
        SyncEvent::ALL.to_vec()
    } else {
        args.events
            .iter()
            .map(|e| e.parse::<SyncEvent>())
            .collect::<Result<Vec<_>, _>>()?
    };

    let console = open_console(config).await?;
    let names: Vec<&str> = events.iter().map(|e| e.as_str()).collect();
    println!(
        "{} {} {}",
        "Watching".cyan().bold(),
        names.join(", "),
        format!("as tab {}", console.tab()).dimmed()
    );

    let count = Arc::new(AtomicU64::new(0));
    let counter = count.clone();
    let hook = use_sync(
        console.sync(),
        &events,
        move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            println!(
                "{} {} refresh",
                chrono::Local::now().format("%H:%M:%S").to_string().dimmed(),
                format!("#{}", n).cyan()
            );
        },
        args.interval_ms.map(Duration::from_millis),
    );

    tokio::signal::ctrl_c().await?;
    hook.unmount();
    console.sync().close();

    println!();
    println!("{} refresh(es)", count.load(Ordering::SeqCst));
    Ok(())
}
