//! Employee shift sessions and statistics.

pub mod model;

use chrono::Utc;
use mdc_store::keys;
use mdc_sync::SyncEvent;
use model::{ShiftSession, ShiftStatistics, ShiftStatus};
use tracing::info;

use crate::console::Console;
use crate::error::MdcResult;

async fn load_sessions(console: &Console) -> MdcResult<Vec<ShiftSession>> {
    console.load(keys::SHIFT_SESSIONS).await
}

async fn save_sessions(console: &Console, sessions: &[ShiftSession]) -> MdcResult<()> {
    console
        .commit(keys::SHIFT_SESSIONS, sessions, SyncEvent::ShiftSessionsUpdated)
        .await
}

async fn load_statistics(console: &Console) -> MdcResult<Vec<ShiftStatistics>> {
    console.load(keys::SHIFT_STATISTICS).await
}

/// Load a user's session, apply `f`, save.
async fn transition<F, T>(console: &Console, user_id: &str, f: F) -> MdcResult<(ShiftSession, T)>
where
    F: FnOnce(&mut ShiftSession) -> MdcResult<T>,
{
    let mut sessions = load_sessions(console).await?;
    let index = match sessions.iter().position(|s| s.user_id == user_id) {
        Some(i) => i,
        None => {
            sessions.push(ShiftSession::new(user_id));
            sessions.len() - 1
        }
    };
    let out = f(&mut sessions[index])?;
    let session = sessions[index].clone();
    save_sessions(console, &sessions).await?;
    Ok((session, out))
}

/// Go on shift, or come back from a break.
pub async fn start_shift(console: &Console, user_id: &str) -> MdcResult<ShiftSession> {
    let (session, ()) = transition(console, user_id, |s| s.start(Utc::now())).await?;
    info!(user_id = %user_id, "Shift started");
    Ok(session)
}

pub async fn start_break(console: &Console, user_id: &str) -> MdcResult<ShiftSession> {
    let (session, ()) = transition(console, user_id, |s| s.begin_break(Utc::now())).await?;
    info!(user_id = %user_id, "Break started");
    Ok(session)
}

/// Close the shift and add it to the user's statistics.
pub async fn end_shift(console: &Console, user_id: &str) -> MdcResult<ShiftStatistics> {
    let now = Utc::now();
    let (_, summary) = transition(console, user_id, |s| s.end(now)).await?;

    let mut all = load_statistics(console).await?;
    let index = match all.iter().position(|s| s.user_id == user_id) {
        Some(i) => i,
        None => {
            all.push(ShiftStatistics::new(user_id));
            all.len() - 1
        }
    };
    all[index].record(summary, now);
    let stats = all[index].clone();
    console
        .commit(keys::SHIFT_STATISTICS, &all, SyncEvent::ShiftStatisticsUpdated)
        .await?;

    info!(
        user_id = %user_id,
        work_ms = summary.work_time,
        break_ms = summary.break_time,
        "Shift ended"
    );
    Ok(stats)
}

/// Record that the user's console is still open. Off-shift users are
/// left alone.
pub async fn shift_heartbeat(console: &Console, user_id: &str) -> MdcResult<()> {
    let mut sessions = load_sessions(console).await?;
    let Some(session) = sessions
        .iter_mut()
        .find(|s| s.user_id == user_id && s.status != ShiftStatus::OffShift)
    else {
        return Ok(());
    };
    session.last_heartbeat = Some(Utc::now());
    save_sessions(console, &sessions).await
}

pub async fn user_shift_session(console: &Console, user_id: &str) -> MdcResult<Option<ShiftSession>> {
    let sessions = load_sessions(console).await?;
    Ok(sessions.into_iter().find(|s| s.user_id == user_id))
}

/// Sessions currently on shift or on break.
pub async fn active_shift_sessions(console: &Console) -> MdcResult<Vec<ShiftSession>> {
    let sessions = load_sessions(console).await?;
    Ok(sessions
        .into_iter()
        .filter(|s| s.status != ShiftStatus::OffShift)
        .collect())
}

pub async fn shift_statistics(console: &Console) -> MdcResult<Vec<ShiftStatistics>> {
    load_statistics(console).await
}

/// A user's totals; zero when they never finished a shift.
pub async fn user_shift_statistics(console: &Console, user_id: &str) -> MdcResult<ShiftStatistics> {
    let all = load_statistics(console).await?;
    Ok(all
        .into_iter()
        .find(|s| s.user_id == user_id)
        .unwrap_or_else(|| ShiftStatistics::new(user_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::testing;
    use crate::error::MdcError;

    #[tokio::test]
    async fn test_full_shift_cycle_updates_statistics() {
        let console = testing::console();
        start_shift(&console, "10004").await.unwrap();
        start_break(&console, "10004").await.unwrap();
        start_shift(&console, "10004").await.unwrap();
        assert_eq!(active_shift_sessions(&console).await.unwrap().len(), 1);

        let stats = end_shift(&console, "10004").await.unwrap();
        assert_eq!(stats.total_shifts, 1);
        assert!(stats.last_shift_end.is_some());

        let session = user_shift_session(&console, "10004").await.unwrap().unwrap();
        assert_eq!(session.status, ShiftStatus::OffShift);
        assert!(active_shift_sessions(&console).await.unwrap().is_empty());

        start_shift(&console, "10004").await.unwrap();
        end_shift(&console, "10004").await.unwrap();
        assert_eq!(user_shift_statistics(&console, "10004").await.unwrap().total_shifts, 2);
    }

    #[tokio::test]
    async fn test_break_before_shift_is_refused() {
        let console = testing::console();
        assert!(matches!(
            start_break(&console, "10004").await,
            Err(MdcError::InvalidStateTransition { .. })
        ));
        assert!(user_shift_session(&console, "10004").await.unwrap().is_none());
        assert_eq!(user_shift_statistics(&console, "10004").await.unwrap().total_shifts, 0);
    }

    #[tokio::test]
    async fn test_heartbeat_only_touches_active_sessions() {
        let console = testing::console();
        shift_heartbeat(&console, "10004").await.unwrap();
        assert!(user_shift_session(&console, "10004").await.unwrap().is_none());

        start_shift(&console, "10004").await.unwrap();
        shift_heartbeat(&console, "10004").await.unwrap();
        let session = user_shift_session(&console, "10004").await.unwrap().unwrap();
        assert!(session.last_heartbeat.is_some());
    }
}
