//! Emergency models and alert timing.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The origin-wide Signal 100 state: radio silence on every channel
/// except emergency traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal100 {
    pub active: bool,
    /// Crew that raised it; `None` when a dispatcher declared it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crew_id: Option<u32>,
    pub triggered_by: String,
    pub triggered_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<String>,
}

impl Signal100 {
    pub fn remaining(&self, window: Duration, now: DateTime<Utc>) -> Duration {
        remaining(&self.triggered_at, window, now)
    }

    /// Active and still within the window.
    pub fn is_live(&self, window: Duration, now: DateTime<Utc>) -> bool {
        self.active && !self.remaining(window, now).is_zero()
    }
}

/// Time left before an alert raised at `triggered_at` lapses.
///
/// Unparseable timestamps count as already lapsed.
pub fn remaining(triggered_at: &str, window: Duration, now: DateTime<Utc>) -> Duration {
    let Ok(raised) = DateTime::parse_from_rfc3339(triggered_at) else {
        return Duration::ZERO;
    };
    let elapsed = now
        .signed_duration_since(raised.with_timezone(&Utc))
        .to_std()
        .unwrap_or(Duration::ZERO);
    window.saturating_sub(elapsed)
}
