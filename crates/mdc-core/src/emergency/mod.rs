//! Panic button and Signal 100.
//!
//! Both alerts lapse on their own after the configured emergency window.
//! Activation is refused while a manager has restricted it.

pub mod model;

use chrono::Utc;
use mdc_store::keys;
use mdc_sync::SyncEvent;
use model::Signal100;
use tracing::{info, warn};

use crate::activity::{self, ActivityKind, NewActivity};
use crate::console::Console;
use crate::crew::{self, model::Crew};
use crate::error::{MdcError, MdcResult};
use crate::restrictions;
use crate::timestamp;
use crate::user;

async fn display_name(console: &Console, user_id: &str) -> MdcResult<String> {
    match user::get_user(console, user_id).await {
        Ok(u) => Ok(u.full_name),
        Err(MdcError::UserNotFound(_)) => Ok(user_id.to_string()),
        Err(e) => Err(e),
    }
}

async fn log(console: &Console, user_id: &str, description: String) -> MdcResult<()> {
    let name = display_name(console, user_id).await?;
    activity::add_activity(
        console,
        NewActivity::new(ActivityKind::Emergency, user_id, name, description),
    )
    .await?;
    Ok(())
}

/// Raise the panic alarm for a crew.
pub async fn activate_panic(console: &Console, crew_id: u32, user_id: &str) -> MdcResult<Crew> {
    if restrictions::get_restrictions(console).await?.panic_disabled {
        return Err(MdcError::Restricted("Panic button".to_string()));
    }
    let crew = crew::modify_crew(console, crew_id, |crew| {
        crew.panic_active = true;
        crew.panic_triggered_at = Some(timestamp());
        crew.panic_triggered_by = Some(user_id.to_string());
    })
    .await?;

    warn!(crew_id, unit = %crew.unit_name, user_id = %user_id, "PANIC activated");
    log(console, user_id, format!("Panic activated by {}", crew.unit_name)).await?;
    Ok(crew)
}

pub async fn reset_panic(console: &Console, crew_id: u32, user_id: &str) -> MdcResult<Crew> {
    let crew = crew::modify_crew(console, crew_id, |crew| {
        crew.panic_active = false;
        crew.panic_triggered_at = None;
        crew.panic_triggered_by = None;
    })
    .await?;

    info!(crew_id, user_id = %user_id, "Panic reset");
    log(console, user_id, format!("Panic reset for {}", crew.unit_name)).await?;
    Ok(crew)
}

/// Crews whose panic alarm is on and has not lapsed.
pub async fn active_panic_alerts(console: &Console) -> MdcResult<Vec<Crew>> {
    let window = console.config().emergency_window();
    let now = Utc::now();
    let crews = crew::list_crews(console).await?;
    Ok(crews
        .into_iter()
        .filter(|c| {
            c.panic_active
                && c.panic_triggered_at
                    .as_deref()
                    .is_some_and(|at| !model::remaining(at, window, now).is_zero())
        })
        .collect())
}

/// Declare Signal 100, optionally on behalf of a crew.
pub async fn activate_signal100(
    console: &Console,
    crew_id: Option<u32>,
    user_id: &str,
) -> MdcResult<Signal100> {
    if restrictions::get_restrictions(console).await?.signal100_disabled {
        return Err(MdcError::Restricted("Signal 100".to_string()));
    }
    let now = timestamp();

    let mut unit = None;
    if let Some(id) = crew_id {
        let crew = crew::modify_crew(console, id, |crew| {
            crew.signal100_active = true;
            crew.signal100_triggered_at = Some(now.clone());
        })
        .await?;
        unit = Some(crew.unit_name);
    }

    let signal = Signal100 {
        active: true,
        crew_id,
        triggered_by: user_id.to_string(),
        triggered_at: now,
        reset_by: None,
        reset_at: None,
    };
    console
        .commit(keys::SIGNAL100, &signal, SyncEvent::Signal100Changed)
        .await?;

    warn!(crew_id = ?crew_id, user_id = %user_id, "SIGNAL 100 declared");
    let source = unit.unwrap_or_else(|| "dispatch".to_string());
    log(console, user_id, format!("Signal 100 declared by {}", source)).await?;
    Ok(signal)
}

/// Lift Signal 100. Returns the lifted state, if one was stored.
pub async fn reset_signal100(console: &Console, user_id: &str) -> MdcResult<Option<Signal100>> {
    let Some(mut signal) = console.store().get::<Signal100>(keys::SIGNAL100).await? else {
        return Ok(None);
    };
    signal.active = false;
    signal.reset_by = Some(user_id.to_string());
    signal.reset_at = Some(timestamp());
    console
        .commit(keys::SIGNAL100, &signal, SyncEvent::Signal100Changed)
        .await?;

    let mut crews = crew::load_crews(console).await?;
    if crews.iter().any(|c| c.signal100_active) {
        for c in crews.iter_mut().filter(|c| c.signal100_active) {
            c.signal100_active = false;
            c.signal100_triggered_at = None;
            c.last_update = timestamp();
        }
        crew::save_crews(console, &crews).await?;
    }

    info!(user_id = %user_id, "Signal 100 lifted");
    log(console, user_id, "Signal 100 lifted".to_string()).await?;
    Ok(Some(signal))
}

/// The live Signal 100, if any. A lapsed one reads as none.
pub async fn active_signal100(console: &Console) -> MdcResult<Option<Signal100>> {
    let signal: Option<Signal100> = console.store().get_or(keys::SIGNAL100, None).await?;
    let window = console.config().emergency_window();
    Ok(signal.filter(|s| s.is_live(window, Utc::now())))
}
