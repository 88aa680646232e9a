//! Activity log command.

use anyhow::Result;
use clap::Args;
use mdc_core::activity;
use mdc_core::MdcConfig;

use super::open_console;
use crate::output;

#[derive(Args)]
pub struct LogArgs {
    /// Only entries by this user id
    #[arg(short, long)]
    pub user: Option<String>,

    /// Maximum entries to show
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

pub async fn execute(args: LogArgs, config: MdcConfig) -> Result<()> {
    let console = open_console(config).await?;

    let mut entries = match &args.user {
        Some(user_id) => activity::user_activity(&console, user_id).await?,
        None => activity::list_activity(&console).await?,
    };
    entries.truncate(args.limit);
    output::print_activity(&entries);

    Ok(())
}
