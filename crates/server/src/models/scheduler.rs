//! Scheduler deadlines (insurance renewals, course expiries, recurring
//! association duties).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use easyvol_core::{SchedulerItemId, SchedulerPriority, SchedulerStatus, UserId};

/// One tracked deadline.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SchedulerItem {
    pub id: SchedulerItemId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    /// Free-form grouping label ("assicurazioni", "revisioni"...).
    pub category: Option<String>,
    pub priority: SchedulerPriority,
    pub status: SchedulerStatus,
    /// Days before `due_date` the item shows up as a reminder.
    pub reminder_days: i32,
    pub assigned_to: Option<UserId>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Form payload for creating or updating a deadline.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerItemPayload {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: SchedulerPriority,
    #[serde(default)]
    pub status: SchedulerStatus,
    #[serde(default = "default_reminder_days")]
    pub reminder_days: i32,
    #[serde(default, deserialize_with = "super::forms::option_id")]
    pub assigned_to: Option<UserId>,
}

const fn default_reminder_days() -> i32 {
    7
}

/// Whitelisted query-string filters for the scheduler list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchedulerFilter {
    #[serde(default, deserialize_with = "super::forms::option_variant")]
    pub status: Option<SchedulerStatus>,
    #[serde(default, deserialize_with = "super::forms::option_variant")]
    pub priority: Option<SchedulerPriority>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}
