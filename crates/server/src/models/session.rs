//! Session-stored types for authentication state.

use serde::{Deserialize, Serialize};

use easyvol_core::{RoleId, UserId};

/// Session-stored identity of the logged-in user.
///
/// Permissions are deliberately not stored here: they are reloaded from the
/// database on each request so a grant change takes effect on the next click.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// Login username.
    pub username: String,
    /// Display name shown in the navbar.
    pub full_name: String,
    /// Role the user belongs to, if any.
    pub role_id: Option<RoleId>,
    /// Role name for display.
    pub role_name: Option<String>,
    /// Whether the user must change the seeded default password before
    /// using the application.
    pub must_change_password: bool,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the per-session CSRF token (32 random bytes, hex-encoded).
    pub const CSRF_TOKEN: &str = "csrf_token";
}
