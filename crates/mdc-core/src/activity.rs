//! Activity log, newest first.

use mdc_store::keys;
use mdc_sync::SyncEvent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::console::Console;
use crate::error::MdcResult;
use crate::timestamp;

/// Oldest entries fall off past this.
pub const MAX_ACTIVITY_ENTRIES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Call,
    CrewStatus,
    Status,
    Emergency,
    Shift,
    User,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: String,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub user_id: String,
    pub user_name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub kind: ActivityKind,
    pub user_id: String,
    pub user_name: String,
    pub description: String,
    pub details: Option<String>,
}

impl NewActivity {
    pub fn new(
        kind: ActivityKind,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            user_id: user_id.into(),
            user_name: user_name.into(),
            description: description.into(),
            details: None,
        }
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

pub async fn list_activity(console: &Console) -> MdcResult<Vec<ActivityLog>> {
    console.load(keys::ACTIVITY_LOG).await
}

pub async fn user_activity(console: &Console, user_id: &str) -> MdcResult<Vec<ActivityLog>> {
    let entries = list_activity(console).await?;
    Ok(entries.into_iter().filter(|e| e.user_id == user_id).collect())
}

/// Record an entry on top of the log.
pub async fn add_activity(console: &Console, new: NewActivity) -> MdcResult<ActivityLog> {
    let mut entries = list_activity(console).await?;
    let entry = ActivityLog {
        id: Uuid::new_v4().to_string(),
        timestamp: timestamp(),
        kind: new.kind,
        user_id: new.user_id,
        user_name: new.user_name,
        description: new.description,
        details: new.details,
    };
    entries.insert(0, entry.clone());
    entries.truncate(MAX_ACTIVITY_ENTRIES);
    console
        .commit(keys::ACTIVITY_LOG, &entries, SyncEvent::ActivityLogUpdated)
        .await?;
    Ok(entry)
}

pub async fn clear_activity_log(console: &Console) -> MdcResult<()> {
    console
        .commit(keys::ACTIVITY_LOG, &Vec::<ActivityLog>::new(), SyncEvent::ActivityLogUpdated)
        .await
}
