//! Accounts, credentials and approval.

pub mod model;

use mdc_store::{keys, StoreError};
use mdc_sync::SyncEvent;
use model::{NewUser, PasswordEntry, Role, User, UserUpdate};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::console::Console;
use crate::error::{MdcError, MdcResult};

const MIN_PASSWORD_LEN: usize = 6;

fn seed_users() -> Vec<User> {
    [
        ("10001", "Petrov Petr Petrovich", Role::Manager, "manager@mdc.system"),
        ("10002", "Ivanov Ivan Ivanovich", Role::Dispatcher, "dispatcher@mdc.system"),
        ("10003", "Sidorov Sergey Sergeevich", Role::Supervisor, "supervisor@mdc.system"),
        ("10004", "Vasiliev Vasily Vasilievich", Role::Employee, "employee@mdc.system"),
    ]
    .into_iter()
    .map(|(id, full_name, role, email)| User {
        id: id.to_string(),
        full_name: full_name.to_string(),
        role,
        email: email.to_string(),
        phone: None,
        approved: true,
    })
    .collect()
}

/// Hex SHA-256 digest of a password.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// All accounts. The first read on a fresh origin stores the seed accounts.
pub async fn list_users(console: &Console) -> MdcResult<Vec<User>> {
    match console.store().get::<Vec<User>>(keys::USERS).await {
        Ok(Some(users)) => return Ok(users),
        Ok(None) => {}
        Err(StoreError::Serialization(e)) => warn!(error = %e, "Users do not decode, reseeding"),
        Err(e) => return Err(e.into()),
    }
    let users = seed_users();
    console.store().set(keys::USERS, &users).await?;
    Ok(users)
}

async fn save_users(console: &Console, users: &[User]) -> MdcResult<()> {
    console.commit(keys::USERS, users, SyncEvent::UsersUpdated).await
}

async fn load_passwords(console: &Console) -> MdcResult<Vec<PasswordEntry>> {
    console.load(keys::USER_PASSWORDS).await
}

async fn store_password(console: &Console, user_id: &str, password: &str) -> MdcResult<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(MdcError::validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    let mut entries = load_passwords(console).await?;
    entries.retain(|e| e.id != user_id);
    entries.push(PasswordEntry {
        id: user_id.to_string(),
        password_hash: hash_password(password),
    });
    // Credentials are never broadcast
    console.store().set(keys::USER_PASSWORDS, &entries).await?;
    Ok(())
}

/// Get a user by ID.
pub async fn get_user(console: &Console, id: &str) -> MdcResult<User> {
    list_users(console)
        .await?
        .into_iter()
        .find(|u| u.id == id)
        .ok_or_else(|| MdcError::UserNotFound(id.to_string()))
}

async fn insert_user(console: &Console, new: NewUser, password: &str, approved: bool) -> MdcResult<User> {
    if new.id.trim().is_empty() || new.full_name.trim().is_empty() {
        return Err(MdcError::validation("id and full name are required"));
    }
    let mut users = list_users(console).await?;
    if users.iter().any(|u| u.id == new.id || u.email.eq_ignore_ascii_case(&new.email)) {
        return Err(MdcError::UserExists(new.id));
    }

    store_password(console, &new.id, password).await?;
    let user = User {
        id: new.id,
        full_name: new.full_name,
        role: new.role,
        email: new.email,
        phone: new.phone,
        approved,
    };
    users.push(user.clone());
    save_users(console, &users).await?;

    info!(user_id = %user.id, role = user.role.as_str(), approved, "User created");
    Ok(user)
}

/// Create an account on behalf of a manager. It is usable right away.
pub async fn create_user(console: &Console, new: NewUser, password: &str) -> MdcResult<User> {
    insert_user(console, new, password, true).await
}

/// Self-registration. The account cannot sign in until approved.
pub async fn register_user(console: &Console, new: NewUser, password: &str) -> MdcResult<User> {
    insert_user(console, new, password, false).await
}

/// Accounts awaiting approval.
pub async fn pending_users(console: &Console) -> MdcResult<Vec<User>> {
    let users = list_users(console).await?;
    Ok(users.into_iter().filter(|u| !u.approved).collect())
}

pub async fn approve_user(console: &Console, id: &str) -> MdcResult<User> {
    let mut users = list_users(console).await?;
    let user = users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or_else(|| MdcError::UserNotFound(id.to_string()))?;
    user.approved = true;
    let approved = user.clone();
    save_users(console, &users).await?;
    info!(user_id = %id, "User approved");
    Ok(approved)
}

pub async fn update_user(console: &Console, id: &str, update: UserUpdate) -> MdcResult<User> {
    let mut users = list_users(console).await?;
    let user = users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or_else(|| MdcError::UserNotFound(id.to_string()))?;
    if let Some(full_name) = update.full_name {
        user.full_name = full_name;
    }
    if let Some(role) = update.role {
        user.role = role;
    }
    if let Some(email) = update.email {
        user.email = email;
    }
    if let Some(phone) = update.phone {
        user.phone = Some(phone);
    }
    let updated = user.clone();
    save_users(console, &users).await?;
    Ok(updated)
}

/// Delete an account and its credential.
pub async fn delete_user(console: &Console, id: &str) -> MdcResult<()> {
    let mut users = list_users(console).await?;
    users.retain(|u| u.id != id);
    save_users(console, &users).await?;

    let mut entries = load_passwords(console).await?;
    entries.retain(|e| e.id != id);
    console.store().set(keys::USER_PASSWORDS, &entries).await?;
    Ok(())
}

/// Set a password without checking the old one.
pub async fn set_password(console: &Console, id: &str, password: &str) -> MdcResult<()> {
    get_user(console, id).await?;
    store_password(console, id, password).await
}

/// Change a password. The current one must match when there is one.
pub async fn change_password(console: &Console, id: &str, current: &str, new: &str) -> MdcResult<()> {
    let entries = load_passwords(console).await?;
    if let Some(entry) = entries.iter().find(|e| e.id == id) {
        if entry.password_hash != hash_password(current) {
            return Err(MdcError::InvalidCredentials);
        }
    }
    set_password(console, id, new).await
}

/// Sign in with an id or email.
pub async fn authenticate(console: &Console, login: &str, password: &str) -> MdcResult<User> {
    let users = list_users(console).await?;
    let Some(user) = users
        .into_iter()
        .find(|u| u.id == login || u.email.eq_ignore_ascii_case(login))
    else {
        warn!(login = %login, "Sign-in for unknown account");
        return Err(MdcError::InvalidCredentials);
    };

    let digest = hash_password(password);
    let entries = load_passwords(console).await?;
    if !entries.iter().any(|e| e.id == user.id && e.password_hash == digest) {
        warn!(user_id = %user.id, "Sign-in with wrong password");
        return Err(MdcError::InvalidCredentials);
    }
    if !user.approved {
        return Err(MdcError::PendingApproval(user.id));
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::testing;

    fn new_user(id: &str, email: &str) -> NewUser {
        NewUser {
            id: id.to_string(),
            full_name: "Smirnov Alexey".to_string(),
            role: Role::Employee,
            email: email.to_string(),
            phone: None,
        }
    }

    #[test]
    fn test_password_digest_is_hex_sha256() {
        assert_eq!(
            hash_password("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_seed_accounts_are_persisted() {
        let console = testing::console();
        let users = list_users(&console).await.unwrap();
        assert_eq!(users.len(), 4);
        assert!(console.store().get_value(keys::USERS).await.unwrap().is_some());
        assert_eq!(get_user(&console, "10001").await.unwrap().role, Role::Manager);
    }

    #[tokio::test]
    async fn test_create_and_authenticate_by_id_or_email() {
        let console = testing::console();
        create_user(&console, new_user("20001", "a@mdc.system"), "secret1")
            .await
            .unwrap();

        assert_eq!(authenticate(&console, "20001", "secret1").await.unwrap().id, "20001");
        assert_eq!(authenticate(&console, "A@mdc.system", "secret1").await.unwrap().id, "20001");
        assert!(matches!(
            authenticate(&console, "20001", "wrong!").await,
            Err(MdcError::InvalidCredentials)
        ));

        let stored = console.store().get_value(keys::USER_PASSWORDS).await.unwrap().unwrap();
        assert!(!stored.to_string().contains("secret1"));
    }

    #[tokio::test]
    async fn test_duplicate_user_is_rejected() {
        let console = testing::console();
        create_user(&console, new_user("20001", "a@mdc.system"), "secret1").await.unwrap();
        assert!(matches!(
            create_user(&console, new_user("20002", "a@mdc.system"), "secret1").await,
            Err(MdcError::UserExists(_))
        ));
    }

    #[tokio::test]
    async fn test_registration_needs_approval() {
        let console = testing::console();
        register_user(&console, new_user("20001", "a@mdc.system"), "secret1").await.unwrap();
        assert_eq!(pending_users(&console).await.unwrap().len(), 1);
        assert!(matches!(
            authenticate(&console, "20001", "secret1").await,
            Err(MdcError::PendingApproval(_))
        ));

        approve_user(&console, "20001").await.unwrap();
        assert!(pending_users(&console).await.unwrap().is_empty());
        assert!(authenticate(&console, "20001", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn test_change_password_checks_current() {
        let console = testing::console();
        create_user(&console, new_user("20001", "a@mdc.system"), "secret1").await.unwrap();

        assert!(matches!(
            change_password(&console, "20001", "nope", "secret2").await,
            Err(MdcError::InvalidCredentials)
        ));
        change_password(&console, "20001", "secret1", "secret2").await.unwrap();
        assert!(authenticate(&console, "20001", "secret2").await.is_ok());
    }

    #[tokio::test]
    async fn test_short_password_is_rejected() {
        let console = testing::console();
        assert!(matches!(
            create_user(&console, new_user("20001", "a@mdc.system"), "123").await,
            Err(MdcError::ValidationError(_))
        ));
        assert!(get_user(&console, "20001").await.is_err());
    }

    #[tokio::test]
    async fn test_update_and_delete_user() {
        let console = testing::console();
        let update = UserUpdate {
            role: Some(Role::Supervisor),
            ..Default::default()
        };
        let user = update_user(&console, "10004", update).await.unwrap();
        assert_eq!(user.role, Role::Supervisor);

        delete_user(&console, "10004").await.unwrap();
        assert!(matches!(
            get_user(&console, "10004").await,
            Err(MdcError::UserNotFound(_))
        ));
    }
}
