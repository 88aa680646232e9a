//! Event taxonomy and wire messages.

use std::fmt;
use std::str::FromStr;

use mdc_store::TabId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SyncError;

/// Category of state change a tab can announce.
///
/// Serialized as the snake_case tag every consumer agrees on
/// (`"crews_updated"`, `"signal100_changed"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncEvent {
    CrewsUpdated,
    CallsUpdated,
    UsersUpdated,
    DispatcherShiftChanged,
    OnlineUsersChanged,
    ActivityLogUpdated,
    Signal100Changed,
    SystemRestrictionsChanged,
    TestsUpdated,
    TestAssignmentsUpdated,
    ShiftSessionsUpdated,
    ShiftStatisticsUpdated,
}

/// Events re-triggered whenever another writer touches an application key.
///
/// Deliberately wider than the changed key: every change re-fetches the
/// boards that matter most.
pub const FALLBACK_EVENTS: [SyncEvent; 4] = [
    SyncEvent::CrewsUpdated,
    SyncEvent::CallsUpdated,
    SyncEvent::DispatcherShiftChanged,
    SyncEvent::OnlineUsersChanged,
];

impl SyncEvent {
    pub const ALL: [SyncEvent; 12] = [
        Self::CrewsUpdated,
        Self::CallsUpdated,
        Self::UsersUpdated,
        Self::DispatcherShiftChanged,
        Self::OnlineUsersChanged,
        Self::ActivityLogUpdated,
        Self::Signal100Changed,
        Self::SystemRestrictionsChanged,
        Self::TestsUpdated,
        Self::TestAssignmentsUpdated,
        Self::ShiftSessionsUpdated,
        Self::ShiftStatisticsUpdated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CrewsUpdated => "crews_updated",
            Self::CallsUpdated => "calls_updated",
            Self::UsersUpdated => "users_updated",
            Self::DispatcherShiftChanged => "dispatcher_shift_changed",
            Self::OnlineUsersChanged => "online_users_changed",
            Self::ActivityLogUpdated => "activity_log_updated",
            Self::Signal100Changed => "signal100_changed",
            Self::SystemRestrictionsChanged => "system_restrictions_changed",
            Self::TestsUpdated => "tests_updated",
            Self::TestAssignmentsUpdated => "test_assignments_updated",
            Self::ShiftSessionsUpdated => "shift_sessions_updated",
            Self::ShiftStatisticsUpdated => "shift_statistics_updated",
        }
    }
}

impl FromStr for SyncEvent {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| SyncError::UnknownEvent(s.to_string()))
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The store cell a notification carries along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    pub key: String,
    pub value: Value,
}

impl SyncPayload {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// What travels between tabs: `{ eventName, data?, timestamp }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMessage {
    pub event_name: SyncEvent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SyncPayload>,
    #[serde(default)]
    pub timestamp: i64,
}

impl SyncMessage {
    pub fn new(event_name: SyncEvent, data: Option<SyncPayload>) -> Self {
        Self {
            event_name,
            data,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// A message tagged with the tab that posted it, so receivers can skip
/// their own posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub origin: TabId,
    #[serde(flatten)]
    pub message: SyncMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_names_roundtrip_through_str() {
        for event in SyncEvent::ALL {
            assert_eq!(event.as_str().parse::<SyncEvent>().unwrap(), event);
            let encoded = serde_json::to_value(event).unwrap();
            assert_eq!(encoded, json!(event.as_str()));
        }
    }

    #[test]
    fn test_unknown_event_name_is_rejected() {
        assert!(matches!(
            "crew_updated".parse::<SyncEvent>(),
            Err(SyncError::UnknownEvent(_))
        ));
        let raw = json!({ "eventName": "not_a_thing", "timestamp": 0 });
        assert!(serde_json::from_value::<SyncMessage>(raw).is_err());
    }

    #[test]
    fn test_message_wire_shape() {
        let msg = SyncMessage {
            event_name: SyncEvent::Signal100Changed,
            data: Some(SyncPayload::new("mdc_signal100", json!({ "active": true }))),
            timestamp: 42,
        };
        let wire = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            wire,
            json!({
                "eventName": "signal100_changed",
                "data": { "key": "mdc_signal100", "value": { "active": true } },
                "timestamp": 42
            })
        );

        let bare = serde_json::from_value::<SyncMessage>(json!({ "eventName": "calls_updated" })).unwrap();
        assert_eq!(bare.data, None);
    }

    #[test]
    fn test_envelope_flattens_message() {
        let env = Envelope {
            origin: TabId::from("tab-9"),
            message: SyncMessage::new(SyncEvent::UsersUpdated, None),
        };
        let wire = serde_json::to_value(&env).unwrap();
        assert_eq!(wire["origin"], json!("tab-9"));
        assert_eq!(wire["eventName"], json!("users_updated"));
    }
}
