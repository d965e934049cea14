//! Adult member registry types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use easyvol_core::{MemberId, MemberStatus, MemberType, UserId, VolunteerStatus};

/// An adult member of the association.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Member {
    pub id: MemberId,
    /// Registration number ("matricola"), unique, zero-padded to 6 digits
    /// when auto-generated.
    pub registration_number: String,
    pub member_type: MemberType,
    pub member_status: MemberStatus,
    pub volunteer_status: VolunteerStatus,
    pub last_name: String,
    pub first_name: String,
    pub birth_date: NaiveDate,
    pub birth_place: Option<String>,
    pub birth_province: Option<String>,
    /// Italian fiscal code, validated on create/update when present.
    pub tax_code: Option<String>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub registration_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<UserId>,
}

impl Member {
    /// "Cognome Nome" as listings and prints show it.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }
}

/// Form payload for creating or updating a member.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberPayload {
    /// Left empty on create to auto-generate the next matricola.
    #[serde(default)]
    pub registration_number: Option<String>,
    #[serde(default)]
    pub member_type: MemberType,
    #[serde(default)]
    pub member_status: MemberStatus,
    #[serde(default)]
    pub volunteer_status: VolunteerStatus,
    pub last_name: String,
    pub first_name: String,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub birth_place: Option<String>,
    #[serde(default)]
    pub birth_province: Option<String>,
    #[serde(default)]
    pub tax_code: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default, deserialize_with = "super::forms::option_from_str")]
    pub registration_date: Option<NaiveDate>,
}

/// Whitelisted query-string filters for the member list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberFilter {
    /// Exact membership status.
    #[serde(default, deserialize_with = "super::forms::option_variant")]
    pub status: Option<MemberStatus>,
    /// Exact volunteer status.
    #[serde(default, deserialize_with = "super::forms::option_variant")]
    pub volunteer_status: Option<VolunteerStatus>,
    /// Case-insensitive substring over last name, first name, matricola and
    /// tax code.
    #[serde(default)]
    pub search: Option<String>,
}

impl MemberFilter {
    /// True when no predicate is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.volunteer_status.is_none()
            && self.search.as_deref().is_none_or(str::is_empty)
    }
}
