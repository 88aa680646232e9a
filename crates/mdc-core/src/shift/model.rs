//! Shift session models and their state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MdcError, MdcResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShiftStatus {
    #[default]
    OffShift,
    OnShift,
    OnBreak,
}

impl ShiftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OffShift => "off-shift",
            Self::OnShift => "on-shift",
            Self::OnBreak => "on-break",
        }
    }
}

/// One employee's current shift. Times are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftSession {
    pub user_id: String,
    pub status: ShiftStatus,
    #[serde(default)]
    pub shift_start: Option<DateTime<Utc>>,
    /// Start of the current work or break segment.
    #[serde(default)]
    pub current_session_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_work_time: i64,
    #[serde(default)]
    pub total_break_time: i64,
    #[serde(default)]
    pub last_heartbeat: Option<DateTime<Utc>>,
}

/// Totals of one finished shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftSummary {
    pub work_time: i64,
    pub break_time: i64,
}

impl ShiftSession {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            status: ShiftStatus::OffShift,
            shift_start: None,
            current_session_start: None,
            total_work_time: 0,
            total_break_time: 0,
            last_heartbeat: None,
        }
    }

    fn segment_ms(&self, now: DateTime<Utc>) -> i64 {
        self.current_session_start
            .map(|start| now.signed_duration_since(start).num_milliseconds().max(0))
            .unwrap_or(0)
    }

    /// Fold the running segment into the matching total.
    fn close_segment(&mut self, now: DateTime<Utc>) {
        let elapsed = self.segment_ms(now);
        match self.status {
            ShiftStatus::OnShift => self.total_work_time += elapsed,
            ShiftStatus::OnBreak => self.total_break_time += elapsed,
            ShiftStatus::OffShift => {}
        }
        self.current_session_start = None;
    }

    /// Go on shift, or come back from a break.
    pub fn start(&mut self, now: DateTime<Utc>) -> MdcResult<()> {
        match self.status {
            ShiftStatus::OnShift => {
                return Err(MdcError::transition(self.status.as_str(), ShiftStatus::OnShift.as_str()))
            }
            ShiftStatus::OffShift => {
                self.shift_start = Some(now);
                self.total_work_time = 0;
                self.total_break_time = 0;
            }
            ShiftStatus::OnBreak => self.close_segment(now),
        }
        self.status = ShiftStatus::OnShift;
        self.current_session_start = Some(now);
        self.last_heartbeat = Some(now);
        Ok(())
    }

    pub fn begin_break(&mut self, now: DateTime<Utc>) -> MdcResult<()> {
        if self.status != ShiftStatus::OnShift {
            return Err(MdcError::transition(self.status.as_str(), ShiftStatus::OnBreak.as_str()));
        }
        self.close_segment(now);
        self.status = ShiftStatus::OnBreak;
        self.current_session_start = Some(now);
        Ok(())
    }

    pub fn end(&mut self, now: DateTime<Utc>) -> MdcResult<ShiftSummary> {
        if self.status == ShiftStatus::OffShift {
            return Err(MdcError::transition(self.status.as_str(), ShiftStatus::OffShift.as_str()));
        }
        self.close_segment(now);
        self.status = ShiftStatus::OffShift;
        Ok(ShiftSummary {
            work_time: self.total_work_time,
            break_time: self.total_break_time,
        })
    }

    /// Work time including the running segment.
    pub fn work_time_at(&self, now: DateTime<Utc>) -> i64 {
        match self.status {
            ShiftStatus::OnShift => self.total_work_time + self.segment_ms(now),
            _ => self.total_work_time,
        }
    }

    pub fn break_time_at(&self, now: DateTime<Utc>) -> i64 {
        match self.status {
            ShiftStatus::OnBreak => self.total_break_time + self.segment_ms(now),
            _ => self.total_break_time,
        }
    }
}

/// Lifetime shift totals for one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftStatistics {
    pub user_id: String,
    pub total_shifts: u32,
    pub total_work_time: i64,
    pub total_break_time: i64,
    #[serde(default)]
    pub last_shift_end: Option<DateTime<Utc>>,
}

impl ShiftStatistics {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            total_shifts: 0,
            total_work_time: 0,
            total_break_time: 0,
            last_shift_end: None,
        }
    }

    pub fn record(&mut self, summary: ShiftSummary, ended_at: DateTime<Utc>) {
        self.total_shifts += 1;
        self.total_work_time += summary.work_time;
        self.total_break_time += summary.break_time;
        self.last_shift_end = Some(ended_at);
    }
}
