//! Call domain models.

use serde::{Deserialize, Serialize};

use crate::error::{MdcError, MdcResult};

/// An incoming emergency call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Call {
    /// `C-<n>`
    pub id: String,
    /// Local `HH:MM` at creation.
    pub time: String,
    pub address: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub priority: CallPriority,
    pub status: CallStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_crew_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispatcher_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispatcher_name: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl Call {
    /// Numeric part of the id, if it has one.
    pub fn number(&self) -> Option<u32> {
        self.id.strip_prefix("C-")?.parse().ok()
    }
}

/// Fields supplied when a call is taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCall {
    pub address: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub priority: CallPriority,
    #[serde(default)]
    pub dispatcher_id: Option<String>,
    #[serde(default)]
    pub dispatcher_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallPriority {
    Urgent,
    High,
    Medium,
    Low,
}

impl CallPriority {
    pub fn from_str(s: &str) -> MdcResult<Self> {
        match s.to_lowercase().as_str() {
            "urgent" => Ok(Self::Urgent),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(MdcError::validation(format!("unknown priority '{}'", other))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Pending,
    Dispatched,
    Completed,
}

impl CallStatus {
    pub fn from_str(s: &str) -> MdcResult<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "dispatched" => Ok(Self::Dispatched),
            "completed" => Ok(Self::Completed),
            other => Err(MdcError::validation(format!("unknown call status '{}'", other))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Dispatched => "dispatched",
            Self::Completed => "completed",
        }
    }
}

/// Per-dispatcher call counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatcherStats {
    pub total_calls: usize,
    pub completed_calls: usize,
    pub active_calls: usize,
    pub pending_calls: usize,
    pub urgent_calls: usize,
}
