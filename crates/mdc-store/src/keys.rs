//! Well-known store keys.
//!
//! Every key the console writes starts with [`KEY_PREFIX`]; the sync layer's
//! storage fallback only reacts to keys carrying it.

pub const KEY_PREFIX: &str = "mdc_";

pub const CALLS: &str = "mdc_calls";
pub const CREWS: &str = "mdc_crews";
pub const USERS: &str = "mdc_users";
pub const USER_PASSWORDS: &str = "mdc_users_passwords";
pub const ONLINE_USERS: &str = "mdc_online_users";
pub const DISPATCHER_SHIFTS: &str = "mdc_dispatcher_shifts";
pub const SIGNAL100: &str = "mdc_signal100";
pub const SYSTEM_RESTRICTIONS: &str = "mdc_system_restrictions";
pub const SHIFT_SESSIONS: &str = "mdc_shift_sessions";
pub const SHIFT_STATISTICS: &str = "mdc_shift_statistics";
pub const ACTIVITY_LOG: &str = "mdc_activity_log";
pub const TESTS: &str = "mdc_tests";
pub const TEST_ASSIGNMENTS: &str = "mdc_test_assignments";
pub const USER_SETTINGS: &str = "mdc_user_settings";

/// Whether `key` belongs to the application namespace.
pub fn is_app_key(key: &str) -> bool {
    key.starts_with(KEY_PREFIX)
}
