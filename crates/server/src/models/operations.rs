//! Operations-center resources: radio directory, radio assignments and the
//! on-call roster.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use easyvol_core::{MemberId, OnCallShiftId, RadioId, RadioStatus, UserId};

/// A radio or other comms device in the directory.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Radio {
    pub id: RadioId,
    pub name: String,
    /// On-air identifier / selective call.
    pub identifier: Option<String>,
    pub device_type: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub status: RadioStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Form payload for creating or updating a radio.
#[derive(Debug, Clone, Deserialize)]
pub struct RadioPayload {
    pub name: String,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub status: RadioStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// An open radio assignment: which volunteer holds which device.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RadioAssignment {
    pub id: i32,
    pub radio_id: RadioId,
    pub member_id: MemberId,
    pub assignee_first_name: String,
    pub assignee_last_name: String,
    pub assigned_by: Option<UserId>,
    pub assignment_date: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// One shift of the on-call roster.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OnCallShift {
    pub id: OnCallShiftId,
    pub member_id: MemberId,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_by: Option<UserId>,
}

/// Form payload for an on-call shift.
#[derive(Debug, Clone, Deserialize)]
pub struct OnCallShiftPayload {
    pub member_id: MemberId,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Radio assignment joined with device data, as the status API returns it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ActiveAssignment {
    pub radio_id: RadioId,
    pub radio_name: String,
    pub identifier: Option<String>,
    pub member_id: MemberId,
    pub assignee_first_name: String,
    pub assignee_last_name: String,
    pub assignment_date: DateTime<Utc>,
}

/// On-call shift joined with the volunteer's name, as the status API
/// returns it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RosterShift {
    pub id: OnCallShiftId,
    pub member_id: MemberId,
    pub first_name: String,
    pub last_name: String,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
}

/// Snapshot returned by `GET /api/operations/status`.
#[derive(Debug, Clone, Serialize)]
pub struct OperationsStatus {
    pub assignments: Vec<ActiveAssignment>,
    pub on_call: Vec<RosterShift>,
    pub available_radios: i64,
    pub open_events: i64,
}
