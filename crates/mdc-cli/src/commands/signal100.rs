//! Signal 100 commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use mdc_core::emergency;
use mdc_core::MdcConfig;

use super::{open_console, settle};
use crate::output;

#[derive(Subcommand)]
pub enum Signal100Commands {
    /// Declare Signal 100
    Activate(ActivateArgs),

    /// Lift Signal 100
    Reset(ResetArgs),

    /// Show the current state
    Status,
}

#[derive(Args)]
pub struct ActivateArgs {
    /// Declaring user id
    #[arg(short, long)]
    pub user: String,

    /// Crew declaring it, if any
    #[arg(long)]
    pub crew: Option<u32>,
}

#[derive(Args)]
pub struct ResetArgs {
    /// User lifting it
    #[arg(short, long)]
    pub user: String,
}

pub async fn execute(cmd: Signal100Commands, config: MdcConfig) -> Result<()> {
    let console = open_console(config).await?;
    let window = console.config().emergency_window();

    match cmd {
        Signal100Commands::Activate(args) => {
            let signal = emergency::activate_signal100(&console, args.crew, &args.user).await?;
            println!("{} {}", "!".red().bold(), "Signal 100 declared".red().bold());
            output::print_signal100(Some(&signal), Some(window));
        }

        Signal100Commands::Reset(args) => match emergency::reset_signal100(&console, &args.user).await? {
            Some(_) => println!("{} Signal 100 lifted", "✓".green().bold()),
            None => println!("{}", "No Signal 100 to lift.".dimmed()),
        },

        Signal100Commands::Status => {
            let signal = emergency::active_signal100(&console).await?;
            let remaining = signal
                .as_ref()
                .map(|s| s.remaining(window, chrono::Utc::now()));
            output::print_signal100(signal.as_ref(), remaining);
        }
    }

    settle().await;
    Ok(())
}
