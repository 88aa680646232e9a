//! Call intake and dispatch.

pub mod model;

use mdc_store::{keys, StoreError};
use mdc_sync::SyncEvent;
use model::{Call, CallPriority, CallStatus, DispatcherStats, NewCall};
use tracing::{debug, info};

use crate::console::Console;
use crate::crew::{self, model::CrewStatus};
use crate::error::{MdcError, MdcResult};
use crate::timestamp;

/// Call numbers start above this.
const FIRST_CALL_NUMBER: u32 = 1000;

type SeedCall = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    CallPriority,
    CallStatus,
    Option<(&'static str, u32)>,
);

const SEED_CALLS: &[SeedCall] = &[
    ("C-1024", "13:48", "45 Lenin St", "Traffic collision", CallPriority::Urgent, CallStatus::Dispatched, Some(("NU-12", 2))),
    ("C-1023", "13:45", "23 Victory Ave", "Fire", CallPriority::Urgent, CallStatus::Pending, None),
    ("C-1022", "13:30", "120 Peace Ave", "Medical assistance", CallPriority::High, CallStatus::Dispatched, Some(("NU-15", 3))),
    ("C-1021", "13:15", "78 Soviet St", "Alarm check", CallPriority::Medium, CallStatus::Completed, Some(("NU-10", 1))),
    ("C-1020", "13:00", "156 Gagarin St", "Medical assistance", CallPriority::High, CallStatus::Completed, Some(("NU-07", 4))),
];

fn seed_calls(now: &str) -> Vec<Call> {
    SEED_CALLS
        .iter()
        .map(|&(id, time, address, call_type, priority, status, unit)| Call {
            id: id.to_string(),
            time: time.to_string(),
            address: address.to_string(),
            call_type: call_type.to_string(),
            priority,
            status,
            assigned_unit: unit.map(|(name, _)| name.to_string()),
            assigned_crew_id: unit.map(|(_, crew)| crew),
            dispatcher_id: unit.map(|_| "10002".to_string()),
            dispatcher_name: unit.map(|_| "Ivanov I.I.".to_string()),
            created_at: now.to_string(),
            completed_at: (status == CallStatus::Completed).then(|| now.to_string()),
        })
        .collect()
}

/// List calls, newest first. An origin that never stored calls sees the
/// seed board.
pub async fn list_calls(console: &Console) -> MdcResult<Vec<Call>> {
    let stored: Option<Vec<Call>> = match console.store().get(keys::CALLS).await {
        Ok(calls) => calls,
        Err(StoreError::Serialization(e)) => {
            debug!(error = %e, "Calls do not decode, showing seed board");
            None
        }
        Err(e) => return Err(e.into()),
    };
    Ok(stored.unwrap_or_else(|| seed_calls(&timestamp())))
}

async fn save_calls(console: &Console, calls: &[Call]) -> MdcResult<()> {
    console.commit(keys::CALLS, calls, SyncEvent::CallsUpdated).await
}

/// Get a call by ID.
pub async fn get_call(console: &Console, id: &str) -> MdcResult<Call> {
    list_calls(console)
        .await?
        .into_iter()
        .find(|c| c.id == id)
        .ok_or_else(|| MdcError::CallNotFound(id.to_string()))
}

/// Take a new call. It gets the next `C-<n>` id and goes on top.
pub async fn create_call(console: &Console, new: NewCall) -> MdcResult<Call> {
    if new.address.trim().is_empty() {
        return Err(MdcError::validation("address is required"));
    }
    let mut calls = list_calls(console).await?;
    let next = calls
        .iter()
        .filter_map(Call::number)
        .fold(FIRST_CALL_NUMBER, u32::max)
        .checked_add(1)
        .ok_or_else(|| MdcError::validation("call id space exhausted"))?;

    let now = chrono::Local::now();
    let call = Call {
        id: format!("C-{}", next),
        time: now.format("%H:%M").to_string(),
        address: new.address,
        call_type: new.call_type,
        priority: new.priority,
        status: CallStatus::Pending,
        assigned_unit: None,
        assigned_crew_id: None,
        dispatcher_id: new.dispatcher_id,
        dispatcher_name: new.dispatcher_name,
        created_at: timestamp(),
        completed_at: None,
    };
    calls.insert(0, call.clone());
    save_calls(console, &calls).await?;

    info!(call_id = %call.id, priority = call.priority.as_str(), "Call created");
    Ok(call)
}

/// Delete a call. Unknown ids are ignored.
pub async fn delete_call(console: &Console, id: &str) -> MdcResult<()> {
    let mut calls = list_calls(console).await?;
    calls.retain(|c| c.id != id);
    save_calls(console, &calls).await
}

/// Move a call to `status`. Completing it stamps `completed_at`.
pub async fn update_call_status(console: &Console, id: &str, status: CallStatus) -> MdcResult<Call> {
    let mut calls = list_calls(console).await?;
    let call = calls
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| MdcError::CallNotFound(id.to_string()))?;

    call.status = status;
    if status == CallStatus::Completed {
        call.completed_at = Some(timestamp());
    }
    let updated = call.clone();
    save_calls(console, &calls).await?;

    debug!(call_id = %id, status = status.as_str(), "Call status updated");
    Ok(updated)
}

/// Hand a call over to another dispatcher.
pub async fn update_call_dispatcher(
    console: &Console,
    id: &str,
    dispatcher_id: &str,
    dispatcher_name: &str,
) -> MdcResult<()> {
    let mut calls = list_calls(console).await?;
    let call = calls
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| MdcError::CallNotFound(id.to_string()))?;
    call.dispatcher_id = Some(dispatcher_id.to_string());
    call.dispatcher_name = Some(dispatcher_name.to_string());
    save_calls(console, &calls).await
}

/// Dispatch a crew to a call: the call becomes `dispatched`, then the crew
/// goes `en-route`. The two writes are independent; a reader may observe
/// one without the other.
pub async fn assign_crew_to_call(console: &Console, call_id: &str, crew_id: u32) -> MdcResult<Call> {
    let crew = crew::get_crew(console, crew_id).await?;

    let mut calls = list_calls(console).await?;
    let call = calls
        .iter_mut()
        .find(|c| c.id == call_id)
        .ok_or_else(|| MdcError::CallNotFound(call_id.to_string()))?;
    call.assigned_crew_id = Some(crew.id);
    call.assigned_unit = Some(crew.unit_name.clone());
    call.status = CallStatus::Dispatched;
    let updated = call.clone();
    save_calls(console, &calls).await?;

    crew::update_crew_status(console, crew_id, CrewStatus::EnRoute, None).await?;

    info!(call_id = %call_id, crew_id, unit = %crew.unit_name, "Crew assigned");
    Ok(updated)
}

/// Calls a crew is or was assigned to.
pub async fn calls_for_crew(console: &Console, crew_id: u32) -> MdcResult<Vec<Call>> {
    let calls = list_calls(console).await?;
    Ok(calls
        .into_iter()
        .filter(|c| c.assigned_crew_id == Some(crew_id))
        .collect())
}

pub async fn dispatcher_stats(console: &Console, dispatcher_id: &str) -> MdcResult<DispatcherStats> {
    let calls = list_calls(console).await?;
    let mine: Vec<&Call> = calls
        .iter()
        .filter(|c| c.dispatcher_id.as_deref() == Some(dispatcher_id))
        .collect();
    let count = |pred: &dyn Fn(&Call) -> bool| mine.iter().filter(|c| pred(c)).count();

    Ok(DispatcherStats {
        total_calls: mine.len(),
        completed_calls: count(&|c| c.status == CallStatus::Completed),
        active_calls: count(&|c| c.status == CallStatus::Dispatched),
        pending_calls: count(&|c| c.status == CallStatus::Pending),
        urgent_calls: count(&|c| c.priority == CallPriority::Urgent),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::testing;

    fn new_call(address: &str) -> NewCall {
        NewCall {
            address: address.to_string(),
            call_type: "Fire".to_string(),
            priority: CallPriority::High,
            dispatcher_id: Some("10002".to_string()),
            dispatcher_name: Some("Ivanov I.I.".to_string()),
        }
    }

    #[tokio::test]
    async fn test_seed_board_when_nothing_stored() {
        let console = testing::console();
        let calls = list_calls(&console).await.unwrap();
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[0].id, "C-1024");
    }

    #[tokio::test]
    async fn test_create_call_numbers_above_existing() {
        let console = testing::console();
        let call = create_call(&console, new_call("1 Main St")).await.unwrap();
        assert_eq!(call.id, "C-1025");
        assert_eq!(call.status, CallStatus::Pending);
        assert_eq!(call.time.len(), 5);

        let calls = list_calls(&console).await.unwrap();
        assert_eq!(calls[0].id, "C-1025");
        assert_eq!(calls.len(), 6);
    }

    #[tokio::test]
    async fn test_create_call_rejects_exhausted_id_space() {
        let console = testing::console();
        let stored = serde_json::json!([{
            "id": "C-4294967295",
            "time": "09:00",
            "address": "1 Main St",
            "type": "Fire",
            "priority": "high",
            "status": "pending",
            "createdAt": "2024-01-01T09:00:00Z"
        }]);
        console.store().set(keys::CALLS, &stored).await.unwrap();

        let err = create_call(&console, new_call("2 Main St")).await.unwrap_err();
        assert!(matches!(err, MdcError::ValidationError(_)));
        assert_eq!(list_calls(&console).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_call_on_empty_board_starts_at_1001() {
        let console = testing::console();
        console
            .commit(keys::CALLS, &Vec::<Call>::new(), SyncEvent::CallsUpdated)
            .await
            .unwrap();
        let call = create_call(&console, new_call("1 Main St")).await.unwrap();
        assert_eq!(call.id, "C-1001");
    }

    #[tokio::test]
    async fn test_blank_address_is_rejected() {
        let console = testing::console();
        assert!(matches!(
            create_call(&console, new_call("  ")).await,
            Err(MdcError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_completing_stamps_completed_at() {
        let console = testing::console();
        let call = update_call_status(&console, "C-1023", CallStatus::Completed)
            .await
            .unwrap();
        assert!(call.completed_at.is_some());
        assert_eq!(get_call(&console, "C-1023").await.unwrap().status, CallStatus::Completed);
    }

    #[tokio::test]
    async fn test_assign_crew_dispatches_call_and_moves_crew() {
        let console = testing::console();
        let crew = crew::create_crew(&console, "NU-20", vec!["10004".to_string()])
            .await
            .unwrap();

        let call = assign_crew_to_call(&console, "C-1023", crew.id).await.unwrap();
        assert_eq!(call.status, CallStatus::Dispatched);
        assert_eq!(call.assigned_unit.as_deref(), Some("NU-20"));

        let crew = crew::get_crew(&console, crew.id).await.unwrap();
        assert_eq!(crew.status, CrewStatus::EnRoute);
        assert_eq!(calls_for_crew(&console, crew.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_assign_unknown_crew_changes_nothing() {
        let console = testing::console();
        assert!(matches!(
            assign_crew_to_call(&console, "C-1023", 99).await,
            Err(MdcError::CrewNotFound(99))
        ));
        assert_eq!(get_call(&console, "C-1023").await.unwrap().status, CallStatus::Pending);
    }

    #[tokio::test]
    async fn test_dispatcher_stats_counts_by_status() {
        let console = testing::console();
        let stats = dispatcher_stats(&console, "10002").await.unwrap();
        assert_eq!(
            stats,
            DispatcherStats {
                total_calls: 4,
                completed_calls: 2,
                active_calls: 2,
                pending_calls: 0,
                urgent_calls: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_delete_and_reassign_dispatcher() {
        let console = testing::console();
        delete_call(&console, "C-1020").await.unwrap();
        update_call_dispatcher(&console, "C-1023", "10005", "Smirnov A.A.")
            .await
            .unwrap();

        let calls = list_calls(&console).await.unwrap();
        assert_eq!(calls.len(), 4);
        let call = get_call(&console, "C-1023").await.unwrap();
        assert_eq!(call.dispatcher_id.as_deref(), Some("10005"));
    }
}
