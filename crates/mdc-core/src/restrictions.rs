//! Manager switches that lock out emergency buttons.

use mdc_store::keys;
use mdc_sync::SyncEvent;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::console::Console;
use crate::error::MdcResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemRestrictions {
    pub panic_disabled: bool,
    pub signal100_disabled: bool,
}

pub async fn get_restrictions(console: &Console) -> MdcResult<SystemRestrictions> {
    console.load(keys::SYSTEM_RESTRICTIONS).await
}

async fn update<F>(console: &Console, f: F) -> MdcResult<SystemRestrictions>
where
    F: FnOnce(&mut SystemRestrictions),
{
    let mut restrictions = get_restrictions(console).await?;
    f(&mut restrictions);
    console
        .commit(
            keys::SYSTEM_RESTRICTIONS,
            &restrictions,
            SyncEvent::SystemRestrictionsChanged,
        )
        .await?;
    info!(
        panic_disabled = restrictions.panic_disabled,
        signal100_disabled = restrictions.signal100_disabled,
        "System restrictions changed"
    );
    Ok(restrictions)
}

pub async fn set_panic_disabled(console: &Console, disabled: bool) -> MdcResult<SystemRestrictions> {
    update(console, |r| r.panic_disabled = disabled).await
}

pub async fn set_signal100_disabled(console: &Console, disabled: bool) -> MdcResult<SystemRestrictions> {
    update(console, |r| r.signal100_disabled = disabled).await
}
