//! Application users, roles and permission grants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use easyvol_core::{MemberId, RoleId, UserId};

/// Seeded password for accounts created from the CLI or the users page.
/// A user created with it must change it on first login, and is not allowed
/// to change it back.
pub const DEFAULT_PASSWORD: &str = "Pw@12345678";

/// Minimum length accepted for a new password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// An application login account.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Argon2id PHC-format hash, never exposed to templates.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub full_name: Option<String>,
    /// Optional link to the member registry row for this person.
    pub member_id: Option<MemberId>,
    pub role_id: Option<RoleId>,
    pub is_active: bool,
    pub must_change_password: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// A role grouping a set of permissions.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Form payload for creating a user account.
#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "super::forms::option_id")]
    pub member_id: Option<MemberId>,
    #[serde(default, deserialize_with = "super::forms::option_id")]
    pub role_id: Option<RoleId>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

/// Form payload for creating or renaming a role.
#[derive(Debug, Clone, Deserialize)]
pub struct RolePayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Whitelisted query-string filters for the user list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    #[serde(default, deserialize_with = "super::forms::option_id")]
    pub role_id: Option<RoleId>,
    #[serde(default, deserialize_with = "super::forms::option_from_str")]
    pub active: Option<bool>,
    #[serde(default)]
    pub search: Option<String>,
}
