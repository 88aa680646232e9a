//! Per-user console preferences.

use std::collections::BTreeMap;

use mdc_store::keys;
use serde::{Deserialize, Serialize};

use crate::console::Console;
use crate::error::MdcResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub sound_on_new_call: bool,
    pub status_notifications: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            sound_on_new_call: true,
            status_notifications: true,
        }
    }
}

/// Settings keyed by user id.
type SettingsTable = BTreeMap<String, UserSettings>;

pub async fn get_user_settings(console: &Console, user_id: &str) -> MdcResult<UserSettings> {
    let table: SettingsTable = console.load(keys::USER_SETTINGS).await?;
    Ok(table.get(user_id).copied().unwrap_or_default())
}

/// Preferences are private to their owner, so no event is announced.
pub async fn save_user_settings(
    console: &Console,
    user_id: &str,
    settings: UserSettings,
) -> MdcResult<()> {
    let mut table: SettingsTable = console.load(keys::USER_SETTINGS).await?;
    table.insert(user_id.to_string(), settings);
    console.store().set(keys::USER_SETTINGS, &table).await?;
    Ok(())
}
