//! Call commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use mdc_core::call::{
    self,
    model::{CallPriority, CallStatus, NewCall},
};
use mdc_core::MdcConfig;

use super::{open_console, settle};
use crate::output;

#[derive(Subcommand)]
pub enum CallCommands {
    /// List calls, newest first
    List(ListCallsArgs),

    /// Log a new call
    Create(CreateCallArgs),

    /// Dispatch a crew to a call
    Assign(AssignArgs),

    /// Change a call's status
    Status(CallStatusArgs),
}

#[derive(Args)]
pub struct ListCallsArgs {
    /// Only calls assigned to this crew
    #[arg(long)]
    pub crew: Option<u32>,
}

#[derive(Args)]
pub struct CreateCallArgs {
    /// Incident address
    pub address: String,

    /// Incident type, e.g. "Cardiac arrest"
    #[arg(short = 't', long = "type")]
    pub call_type: String,

    /// Priority (urgent, high, medium, low)
    #[arg(long, default_value = "medium")]
    pub priority: String,

    /// Dispatcher user id
    #[arg(long)]
    pub dispatcher: Option<String>,
}

#[derive(Args)]
pub struct AssignArgs {
    /// Call id, e.g. C-1025
    pub call_id: String,

    /// Crew id
    pub crew_id: u32,
}

#[derive(Args)]
pub struct CallStatusArgs {
    /// Call id
    pub call_id: String,

    /// New status (pending, dispatched, completed)
    pub status: String,
}

pub async fn execute(cmd: CallCommands, config: MdcConfig) -> Result<()> {
    let console = open_console(config).await?;

    match cmd {
        CallCommands::List(args) => {
            let calls = match args.crew {
                Some(crew_id) => call::calls_for_crew(&console, crew_id).await?,
                None => call::list_calls(&console).await?,
            };
            output::print_calls_table(&calls);
        }

        CallCommands::Create(args) => {
            let dispatcher_name = match &args.dispatcher {
                Some(id) => Some(mdc_core::user::get_user(&console, id).await?.full_name),
                None => None,
            };
            let created = call::create_call(
                &console,
                NewCall {
                    address: args.address,
                    call_type: args.call_type,
                    priority: CallPriority::from_str(&args.priority)?,
                    dispatcher_id: args.dispatcher,
                    dispatcher_name,
                },
            )
            .await?;
            println!(
                "{} Created call: {} ({})",
                "✓".green().bold(),
                created.id.cyan(),
                created.address.dimmed()
            );
        }

        CallCommands::Assign(args) => {
            let updated = call::assign_crew_to_call(&console, &args.call_id, args.crew_id).await?;
            println!(
                "{} Dispatched {} to {}",
                "✓".green().bold(),
                updated.assigned_unit.as_deref().unwrap_or("crew").cyan(),
                updated.id.cyan()
            );
        }

        CallCommands::Status(args) => {
            let status = CallStatus::from_str(&args.status)?;
            let updated = call::update_call_status(&console, &args.call_id, status).await?;
            println!(
                "{} {} is now {}",
                "✓".green().bold(),
                updated.id.cyan(),
                updated.status.as_str().yellow()
            );
        }
    }

    settle().await;
    Ok(())
}
