//! User account management commands.
//!
//! New accounts are seeded with the default password and must change it
//! at the first login.

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher};
use easyvol_core::{RoleId, UserId};

use super::CommandError;

/// Seeded initial password, same value the web login screen names in its
/// forced-change message.
const DEFAULT_PASSWORD: &str = "Pw@12345678";

/// Create a new user account.
///
/// The account is created active, with `must_change_password` set, and
/// optionally attached to an existing role by name.
pub async fn create(
    username: &str,
    email: &str,
    full_name: Option<&str>,
    role: Option<&str>,
) -> Result<(), CommandError> {
    let pool = super::connect().await?;

    let existing: Option<UserId> = sqlx::query_scalar("SELECT id FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(&pool)
        .await?;
    if existing.is_some() {
        return Err(CommandError::UserExists(username.to_owned()));
    }

    let role_id: Option<RoleId> = match role {
        Some(name) => Some(
            sqlx::query_scalar("SELECT id FROM roles WHERE name = $1")
                .bind(name)
                .fetch_optional(&pool)
                .await?
                .ok_or_else(|| CommandError::RoleNotFound(name.to_owned()))?,
        ),
        None => None,
    };

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(DEFAULT_PASSWORD.as_bytes(), &salt)
        .map_err(|e| CommandError::Hashing(e.to_string()))?
        .to_string();

    let id: UserId = sqlx::query_scalar(
        "INSERT INTO users (username, password_hash, email, full_name, role_id,
                            is_active, must_change_password)
         VALUES ($1, $2, $3, $4, $5, TRUE, TRUE)
         RETURNING id",
    )
    .bind(username)
    .bind(&password_hash)
    .bind(email)
    .bind(full_name)
    .bind(role_id)
    .fetch_one(&pool)
    .await?;

    tracing::info!("Created user {username} (id {id}), default password must be changed at first login");
    Ok(())
}
