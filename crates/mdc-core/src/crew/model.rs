//! Crew domain models.

use serde::{Deserialize, Serialize};

use crate::error::{MdcError, MdcResult};

/// A field unit and the users riding in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crew {
    pub id: u32,
    pub unit_name: String,
    pub status: CrewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub last_update: String,
    /// User ids.
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub panic_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panic_triggered_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panic_triggered_by: Option<String>,
    #[serde(default)]
    pub signal100_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal100_triggered_at: Option<String>,
}

impl Crew {
    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrewStatus {
    Available,
    EnRoute,
    OnScene,
    Unavailable,
}

impl CrewStatus {
    pub fn from_str(s: &str) -> MdcResult<Self> {
        match s.to_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "en-route" | "en_route" => Ok(Self::EnRoute),
            "on-scene" | "on_scene" => Ok(Self::OnScene),
            "unavailable" => Ok(Self::Unavailable),
            other => Err(MdcError::validation(format!("unknown crew status '{}'", other))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::EnRoute => "en-route",
            Self::OnScene => "on-scene",
            Self::Unavailable => "unavailable",
        }
    }
}
