//! Crew panic commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use mdc_core::emergency;
use mdc_core::MdcConfig;

use super::{open_console, settle};
use crate::output;

#[derive(Subcommand)]
pub enum PanicCommands {
    /// Raise a crew's panic alarm
    Activate(PanicArgs),

    /// Clear a crew's panic alarm
    Reset(PanicArgs),

    /// List live panic alerts
    List,
}

#[derive(Args)]
pub struct PanicArgs {
    /// Crew id
    pub crew_id: u32,

    /// Acting user id
    #[arg(short, long)]
    pub user: String,
}

pub async fn execute(cmd: PanicCommands, config: MdcConfig) -> Result<()> {
    let console = open_console(config).await?;

    match cmd {
        PanicCommands::Activate(args) => {
            let crew = emergency::activate_panic(&console, args.crew_id, &args.user).await?;
            println!(
                "{} Panic raised for {}",
                "!".red().bold(),
                crew.unit_name.red().bold()
            );
        }

        PanicCommands::Reset(args) => {
            let crew = emergency::reset_panic(&console, args.crew_id, &args.user).await?;
            println!("{} Panic cleared for {}", "✓".green().bold(), crew.unit_name.cyan());
        }

        PanicCommands::List => {
            let crews = emergency::active_panic_alerts(&console).await?;
            output::print_crews_table(&crews);
        }
    }

    settle().await;
    Ok(())
}
