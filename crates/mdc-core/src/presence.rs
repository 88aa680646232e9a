//! Who is online.
//!
//! Each signed-in console sends a heartbeat; entries that stop beating for
//! longer than the presence timeout drop out on the next read.

use std::time::Duration;

use chrono::{DateTime, Utc};
use mdc_store::keys;
use mdc_sync::SyncEvent;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::console::Console;
use crate::error::MdcResult;
use crate::user::model::User;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineUser {
    #[serde(flatten)]
    pub user: User,
    pub last_seen: DateTime<Utc>,
}

impl OnlineUser {
    pub fn is_stale(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        let age = now.signed_duration_since(self.last_seen);
        age.to_std().map_or(false, |age| age > timeout)
    }
}

async fn save(console: &Console, online: &[OnlineUser]) -> MdcResult<()> {
    console
        .commit(keys::ONLINE_USERS, online, SyncEvent::OnlineUsersChanged)
        .await
}

/// Mark `user` online as of now.
pub async fn heartbeat(console: &Console, user: &User) -> MdcResult<()> {
    let mut online: Vec<OnlineUser> = console.load(keys::ONLINE_USERS).await?;
    let now = Utc::now();
    match online.iter_mut().find(|o| o.user.id == user.id) {
        Some(entry) => {
            entry.user = user.clone();
            entry.last_seen = now;
        }
        None => online.push(OnlineUser {
            user: user.clone(),
            last_seen: now,
        }),
    }
    save(console, &online).await
}

/// Sign-out.
pub async fn remove_online_user(console: &Console, user_id: &str) -> MdcResult<()> {
    let mut online: Vec<OnlineUser> = console.load(keys::ONLINE_USERS).await?;
    let before = online.len();
    online.retain(|o| o.user.id != user_id);
    if online.len() != before {
        save(console, &online).await?;
    }
    Ok(())
}

/// Users with a recent heartbeat. Stale entries are removed from the store.
pub async fn list_online_users(console: &Console) -> MdcResult<Vec<OnlineUser>> {
    let mut online: Vec<OnlineUser> = console.load(keys::ONLINE_USERS).await?;
    let timeout = console.config().presence_timeout();
    let now = Utc::now();

    let before = online.len();
    online.retain(|o| !o.is_stale(now, timeout));
    if online.len() != before {
        debug!(dropped = before - online.len(), "Pruned stale online users");
        save(console, &online).await?;
    }
    Ok(online)
}

/// Online users who can be put in a crew: no dispatchers, managers or
/// supervisors.
pub async fn available_crew_members(console: &Console) -> MdcResult<Vec<User>> {
    let online = list_online_users(console).await?;
    Ok(online
        .into_iter()
        .map(|o| o.user)
        .filter(|u| u.role.is_field())
        .collect())
}
