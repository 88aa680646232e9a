//! Crew roster and unit status.

pub mod model;

use mdc_store::keys;
use mdc_sync::SyncEvent;
use model::{Crew, CrewStatus};
use tracing::{debug, info};

use crate::console::Console;
use crate::error::{MdcError, MdcResult};
use crate::timestamp;

/// Where a freshly formed crew is assumed to be.
pub const DEFAULT_CREW_LOCATION: &str = "Station";

/// Every stored crew, including ones without members.
pub(crate) async fn load_crews(console: &Console) -> MdcResult<Vec<Crew>> {
    console.load(keys::CREWS).await
}

pub(crate) async fn save_crews(console: &Console, crews: &[Crew]) -> MdcResult<()> {
    console.commit(keys::CREWS, crews, SyncEvent::CrewsUpdated).await
}

/// Crews that have at least one member.
pub async fn list_crews(console: &Console) -> MdcResult<Vec<Crew>> {
    let crews = load_crews(console).await?;
    Ok(crews.into_iter().filter(|c| !c.members.is_empty()).collect())
}

/// Get a crew by ID.
pub async fn get_crew(console: &Console, id: u32) -> MdcResult<Crew> {
    load_crews(console)
        .await?
        .into_iter()
        .find(|c| c.id == id)
        .ok_or(MdcError::CrewNotFound(id))
}

/// Form a crew. It starts `available` at the station.
pub async fn create_crew(console: &Console, unit_name: &str, members: Vec<String>) -> MdcResult<Crew> {
    if unit_name.trim().is_empty() {
        return Err(MdcError::validation("unit name is required"));
    }
    let mut crews = load_crews(console).await?;
    let id = crews
        .iter()
        .map(|c| c.id)
        .max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| MdcError::validation("crew id space exhausted"))?;

    let crew = Crew {
        id,
        unit_name: unit_name.to_string(),
        status: CrewStatus::Available,
        location: Some(DEFAULT_CREW_LOCATION.to_string()),
        last_update: timestamp(),
        members,
        panic_active: false,
        panic_triggered_at: None,
        panic_triggered_by: None,
        signal100_active: false,
        signal100_triggered_at: None,
    };
    crews.push(crew.clone());
    save_crews(console, &crews).await?;

    info!(crew_id = id, unit = %unit_name, "Crew created");
    Ok(crew)
}

/// Rename a crew or change its members.
pub async fn update_crew(
    console: &Console,
    id: u32,
    unit_name: &str,
    members: Vec<String>,
) -> MdcResult<Crew> {
    modify_crew(console, id, |crew| {
        crew.unit_name = unit_name.to_string();
        crew.members = members;
    })
    .await
}

/// Disband a crew. Unknown ids are ignored.
pub async fn delete_crew(console: &Console, id: u32) -> MdcResult<()> {
    let mut crews = load_crews(console).await?;
    crews.retain(|c| c.id != id);
    save_crews(console, &crews).await
}

/// Report a crew's status. `location` is kept when not given.
pub async fn update_crew_status(
    console: &Console,
    id: u32,
    status: CrewStatus,
    location: Option<&str>,
) -> MdcResult<Crew> {
    let crew = modify_crew(console, id, |crew| {
        crew.status = status;
        if let Some(location) = location.filter(|l| !l.is_empty()) {
            crew.location = Some(location.to_string());
        }
    })
    .await?;
    debug!(crew_id = id, status = status.as_str(), "Crew status updated");
    Ok(crew)
}

/// The crew `user_id` is a member of, if any.
pub async fn crew_for_user(console: &Console, user_id: &str) -> MdcResult<Option<Crew>> {
    let crews = list_crews(console).await?;
    Ok(crews.into_iter().find(|c| c.has_member(user_id)))
}

/// Apply `f` to one crew, stamp `last_update` and save.
pub(crate) async fn modify_crew<F>(console: &Console, id: u32, f: F) -> MdcResult<Crew>
where
    F: FnOnce(&mut Crew),
{
    let mut crews = load_crews(console).await?;
    let crew = crews
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or(MdcError::CrewNotFound(id))?;
    f(crew);
    crew.last_update = timestamp();
    let updated = crew.clone();
    save_crews(console, &crews).await?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::testing;

    fn members(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_create_crew_assigns_next_id() {
        let console = testing::console();
        let a = create_crew(&console, "NU-01", members(&["10004"])).await.unwrap();
        let b = create_crew(&console, "NU-02", members(&["10005"])).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(b.status, CrewStatus::Available);
        assert_eq!(b.location.as_deref(), Some(DEFAULT_CREW_LOCATION));
    }

    #[tokio::test]
    async fn test_create_crew_rejects_exhausted_id_space() {
        let console = testing::console();
        let stored = serde_json::json!([{
            "id": u32::MAX,
            "unitName": "NU-99",
            "status": "available",
            "lastUpdate": "2024-01-01T09:00:00Z",
            "members": ["10004"]
        }]);
        console.store().set(keys::CREWS, &stored).await.unwrap();

        let err = create_crew(&console, "NU-100", members(&["10005"])).await.unwrap_err();
        assert!(matches!(err, MdcError::ValidationError(_)));
        assert_eq!(list_crews(&console).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_memberless_crews_are_hidden() {
        let console = testing::console();
        create_crew(&console, "NU-01", vec![]).await.unwrap();
        create_crew(&console, "NU-02", members(&["10004"])).await.unwrap();

        let crews = list_crews(&console).await.unwrap();
        assert_eq!(crews.len(), 1);
        assert_eq!(crews[0].unit_name, "NU-02");
    }

    #[tokio::test]
    async fn test_status_update_keeps_location_unless_given() {
        let console = testing::console();
        let crew = create_crew(&console, "NU-01", members(&["10004"])).await.unwrap();

        let moved = update_crew_status(&console, crew.id, CrewStatus::OnScene, Some("12 Oak St"))
            .await
            .unwrap();
        assert_eq!(moved.location.as_deref(), Some("12 Oak St"));

        let back = update_crew_status(&console, crew.id, CrewStatus::Available, None)
            .await
            .unwrap();
        assert_eq!(back.location.as_deref(), Some("12 Oak St"));
        assert_eq!(back.status, CrewStatus::Available);
    }

    #[tokio::test]
    async fn test_update_unknown_crew_fails() {
        let console = testing::console();
        assert!(matches!(
            update_crew_status(&console, 7, CrewStatus::OnScene, None).await,
            Err(MdcError::CrewNotFound(7))
        ));
    }

    #[tokio::test]
    async fn test_crew_for_user_and_delete() {
        let console = testing::console();
        let crew = create_crew(&console, "NU-01", members(&["10004", "10006"])).await.unwrap();
        update_crew(&console, crew.id, "NU-01A", members(&["10006"])).await.unwrap();

        assert!(crew_for_user(&console, "10004").await.unwrap().is_none());
        let found = crew_for_user(&console, "10006").await.unwrap().unwrap();
        assert_eq!(found.unit_name, "NU-01A");

        delete_crew(&console, crew.id).await.unwrap();
        assert!(list_crews(&console).await.unwrap().is_empty());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_value(CrewStatus::EnRoute).unwrap(), "en-route");
        assert_eq!(CrewStatus::from_str("on-scene").unwrap(), CrewStatus::OnScene);
        assert!(CrewStatus::from_str("lost").is_err());
    }
}
