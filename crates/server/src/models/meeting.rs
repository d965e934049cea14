//! Assemblies, board meetings and their agendas.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use easyvol_core::{AgendaItemId, MeetingId, MeetingType};

/// A convened meeting (assembly, board, squad).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Meeting {
    pub id: MeetingId,
    pub meeting_type: MeetingType,
    /// Per-type progressive number used in minutes ("verbale n. 3/2026").
    pub progressive_number: Option<i32>,
    pub meeting_date: NaiveDate,
    pub location: Option<String>,
    /// Who convened the meeting.
    pub convocator: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One ordered agenda item of a meeting.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AgendaItem {
    pub id: AgendaItemId,
    pub meeting_id: MeetingId,
    /// 1-based position in the agenda.
    pub position: i32,
    pub title: String,
    pub description: Option<String>,
}

/// A meeting together with its ordered agenda, as the detail page shows it.
#[derive(Debug, Clone, Serialize)]
pub struct MeetingDetail {
    pub meeting: Meeting,
    pub agenda: Vec<AgendaItem>,
}

/// Form payload for creating or updating a meeting.
#[derive(Debug, Clone, Deserialize)]
pub struct MeetingPayload {
    pub meeting_type: MeetingType,
    #[serde(default, deserialize_with = "super::forms::option_from_str")]
    pub progressive_number: Option<i32>,
    pub meeting_date: NaiveDate,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub convocator: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Form payload for one agenda item.
#[derive(Debug, Clone, Deserialize)]
pub struct AgendaItemPayload {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Whitelisted query-string filters for the meeting list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeetingFilter {
    #[serde(default, deserialize_with = "super::forms::option_variant")]
    pub meeting_type: Option<MeetingType>,
    #[serde(default, deserialize_with = "super::forms::option_from_str")]
    pub from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "super::forms::option_from_str")]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub search: Option<String>,
}
