//! Crew commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use mdc_core::crew::{self, model::CrewStatus};
use mdc_core::MdcConfig;

use super::{open_console, settle};
use crate::output;

#[derive(Subcommand)]
pub enum CrewCommands {
    /// List crews with members
    List,

    /// Form a new crew
    Create(CreateCrewArgs),

    /// Report a crew's status
    Status(CrewStatusArgs),
}

#[derive(Args)]
pub struct CreateCrewArgs {
    /// Unit name, e.g. "Medic 7"
    pub unit_name: String,

    /// Member user ids
    #[arg(short, long = "member")]
    pub members: Vec<String>,
}

#[derive(Args)]
pub struct CrewStatusArgs {
    /// Crew id
    pub crew_id: u32,

    /// New status (available, en-route, on-scene, unavailable)
    pub status: String,

    /// Current location
    #[arg(short, long)]
    pub location: Option<String>,
}

pub async fn execute(cmd: CrewCommands, config: MdcConfig) -> Result<()> {
    let console = open_console(config).await?;

    match cmd {
        CrewCommands::List => {
            let crews = crew::list_crews(&console).await?;
            output::print_crews_table(&crews);
        }

        CrewCommands::Create(args) => {
            let created = crew::create_crew(&console, &args.unit_name, args.members).await?;
            println!(
                "{} Created crew: {} ({})",
                "✓".green().bold(),
                created.unit_name.cyan(),
                created.id.to_string().dimmed()
            );
        }

        CrewCommands::Status(args) => {
            let status = CrewStatus::from_str(&args.status)?;
            let updated =
                crew::update_crew_status(&console, args.crew_id, status, args.location.as_deref())
                    .await?;
            println!(
                "{} {} is now {}",
                "✓".green().bold(),
                updated.unit_name.cyan(),
                updated.status.as_str().yellow()
            );
        }
    }

    settle().await;
    Ok(())
}
