//! Work shift commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use mdc_core::shift;
use mdc_core::MdcConfig;

use super::{open_console, settle};
use crate::output;

#[derive(Subcommand)]
pub enum ShiftCommands {
    /// Start or resume a shift
    Start(UserArg),

    /// Go on break
    Break(UserArg),

    /// End the shift
    End(UserArg),

    /// Show the current session and totals
    Status(UserArg),
}

#[derive(Args)]
pub struct UserArg {
    /// User id
    pub user_id: String,
}

pub async fn execute(cmd: ShiftCommands, config: MdcConfig) -> Result<()> {
    let console = open_console(config).await?;

    match cmd {
        ShiftCommands::Start(args) => {
            shift::start_shift(&console, &args.user_id).await?;
            println!("{} {} is on shift", "✓".green().bold(), args.user_id.cyan());
        }

        ShiftCommands::Break(args) => {
            shift::start_break(&console, &args.user_id).await?;
            println!("{} {} is on break", "✓".green().bold(), args.user_id.cyan());
        }

        ShiftCommands::End(args) => {
            let stats = shift::end_shift(&console, &args.user_id).await?;
            println!("{} Shift ended", "✓".green().bold());
            output::print_shift(None, &stats);
        }

        ShiftCommands::Status(args) => {
            let session = shift::user_shift_session(&console, &args.user_id).await?;
            let stats = shift::user_shift_statistics(&console, &args.user_id).await?;
            output::print_shift(session.as_ref(), &stats);
        }
    }

    settle().await;
    Ok(())
}
