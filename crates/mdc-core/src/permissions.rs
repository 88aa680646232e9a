//! Role checks. A missing user is allowed nothing.

use crate::user::model::{Role, User};

fn has_role(user: Option<&User>, roles: &[Role]) -> bool {
    user.is_some_and(|u| roles.contains(&u.role))
}

pub fn can_delete_calls(user: Option<&User>) -> bool {
    has_role(user, &[Role::Manager])
}

pub fn can_delete_logs(user: Option<&User>) -> bool {
    has_role(user, &[Role::Manager])
}

pub fn can_edit_dispatchers(user: Option<&User>) -> bool {
    has_role(user, &[Role::Manager])
}

pub fn can_manage_accounts(user: Option<&User>) -> bool {
    has_role(user, &[Role::Manager, Role::Supervisor])
}

/// Lifting Signal 100 and resetting panic alarms is desk work.
pub fn can_reset_emergency(user: Option<&User>) -> bool {
    has_role(user, &[Role::Manager, Role::Dispatcher, Role::Supervisor])
}
