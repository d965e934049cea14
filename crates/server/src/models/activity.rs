//! Activity log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use easyvol_core::UserId;

/// One audit row: who did what, in which module, to which record.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ActivityLogEntry {
    pub id: i64,
    pub user_id: Option<UserId>,
    /// Username resolved at read time for the listing page.
    pub username: Option<String>,
    pub module: String,
    pub action: String,
    pub record_id: Option<i32>,
    pub description: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// What a mutating handler records.
#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub user_id: UserId,
    pub module: &'static str,
    pub action: &'static str,
    pub record_id: Option<i32>,
    pub description: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Whitelisted query-string filters for the activity log page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityFilter {
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default, deserialize_with = "super::forms::option_id")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub search: Option<String>,
}
