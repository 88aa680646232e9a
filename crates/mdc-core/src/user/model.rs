//! User domain models.

use serde::{Deserialize, Serialize};

use crate::error::{MdcError, MdcResult};

/// A console account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub role: Role,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Self-registered accounts wait for a manager.
    #[serde(default = "approved_by_default")]
    pub approved: bool,
}

fn approved_by_default() -> bool {
    true
}

/// Fields accepted when creating or registering an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub id: String,
    pub full_name: String,
    pub role: Role,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Partial update; `None` leaves the field alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Dispatcher,
    Supervisor,
    Employee,
}

impl Role {
    pub fn from_str(s: &str) -> MdcResult<Self> {
        match s.to_lowercase().as_str() {
            "manager" => Ok(Self::Manager),
            "dispatcher" => Ok(Self::Dispatcher),
            "supervisor" => Ok(Self::Supervisor),
            "employee" => Ok(Self::Employee),
            other => Err(MdcError::validation(format!("unknown role '{}'", other))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Dispatcher => "dispatcher",
            Self::Supervisor => "supervisor",
            Self::Employee => "employee",
        }
    }

    /// Field roles can ride in a crew; desk roles cannot.
    pub fn is_field(&self) -> bool {
        matches!(self, Self::Employee)
    }
}

/// Stored credential. Only the SHA-256 hex digest is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordEntry {
    pub id: String,
    pub password_hash: String,
}
