//! Dispatcher duty shifts.

use mdc_store::keys;
use mdc_sync::SyncEvent;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::console::Console;
use crate::error::MdcResult;
use crate::timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatcherShift {
    pub dispatcher_id: String,
    pub dispatcher_name: String,
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub is_active: bool,
}

async fn load(console: &Console) -> MdcResult<Vec<DispatcherShift>> {
    console.load(keys::DISPATCHER_SHIFTS).await
}

async fn save(console: &Console, shifts: &[DispatcherShift]) -> MdcResult<()> {
    console
        .commit(keys::DISPATCHER_SHIFTS, shifts, SyncEvent::DispatcherShiftChanged)
        .await
}

/// Put a dispatcher on duty. Starting twice returns the running shift.
pub async fn start_dispatcher_shift(
    console: &Console,
    dispatcher_id: &str,
    dispatcher_name: &str,
) -> MdcResult<DispatcherShift> {
    let mut shifts = load(console).await?;
    if let Some(running) = shifts
        .iter()
        .find(|s| s.is_active && s.dispatcher_id == dispatcher_id)
    {
        return Ok(running.clone());
    }

    let shift = DispatcherShift {
        dispatcher_id: dispatcher_id.to_string(),
        dispatcher_name: dispatcher_name.to_string(),
        start_time: timestamp(),
        end_time: None,
        is_active: true,
    };
    shifts.push(shift.clone());
    save(console, &shifts).await?;

    info!(dispatcher_id = %dispatcher_id, "Dispatcher shift started");
    Ok(shift)
}

/// Take a dispatcher off duty. Returns the closed shift, if one was running.
pub async fn end_dispatcher_shift(
    console: &Console,
    dispatcher_id: &str,
) -> MdcResult<Option<DispatcherShift>> {
    let mut shifts = load(console).await?;
    let Some(shift) = shifts
        .iter_mut()
        .find(|s| s.is_active && s.dispatcher_id == dispatcher_id)
    else {
        return Ok(None);
    };
    shift.is_active = false;
    shift.end_time = Some(timestamp());
    let ended = shift.clone();
    save(console, &shifts).await?;

    info!(dispatcher_id = %dispatcher_id, "Dispatcher shift ended");
    Ok(Some(ended))
}

pub async fn active_dispatcher_shifts(console: &Console) -> MdcResult<Vec<DispatcherShift>> {
    let shifts = load(console).await?;
    Ok(shifts.into_iter().filter(|s| s.is_active).collect())
}

pub async fn is_dispatcher_on_duty(console: &Console, dispatcher_id: &str) -> MdcResult<bool> {
    let active = active_dispatcher_shifts(console).await?;
    Ok(active.iter().any(|s| s.dispatcher_id == dispatcher_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::testing;

    #[tokio::test]
    async fn test_start_is_idempotent_and_end_closes() {
        let console = testing::console();
        let first = start_dispatcher_shift(&console, "10002", "Ivanov I.I.").await.unwrap();
        let again = start_dispatcher_shift(&console, "10002", "Ivanov I.I.").await.unwrap();
        assert_eq!(first, again);
        assert_eq!(active_dispatcher_shifts(&console).await.unwrap().len(), 1);
        assert!(is_dispatcher_on_duty(&console, "10002").await.unwrap());

        let ended = end_dispatcher_shift(&console, "10002").await.unwrap().unwrap();
        assert!(!ended.is_active);
        assert!(ended.end_time.is_some());
        assert!(!is_dispatcher_on_duty(&console, "10002").await.unwrap());
        assert!(end_dispatcher_shift(&console, "10002").await.unwrap().is_none());
    }
}
