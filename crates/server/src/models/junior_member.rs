//! Junior member (under-18) registry types.
//!
//! Junior rows carry guardian details inline instead of the related tables
//! the adult registry has.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use easyvol_core::{JuniorMemberId, MemberStatus, UserId};

/// An under-18 member with guardian contact details.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct JuniorMember {
    pub id: JuniorMemberId,
    pub registration_number: String,
    pub member_status: MemberStatus,
    pub last_name: String,
    pub first_name: String,
    pub birth_date: NaiveDate,
    pub birth_place: Option<String>,
    pub birth_province: Option<String>,
    pub tax_code: Option<String>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub registration_date: NaiveDate,
    pub guardian_last_name: Option<String>,
    pub guardian_first_name: Option<String>,
    pub guardian_tax_code: Option<String>,
    pub guardian_phone: Option<String>,
    pub guardian_email: Option<String>,
    pub guardian_relationship: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<UserId>,
}

impl JuniorMember {
    /// "Cognome Nome" as listings and prints show it.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }
}

/// Form payload for creating or updating a junior member.
#[derive(Debug, Clone, Deserialize)]
pub struct JuniorMemberPayload {
    #[serde(default)]
    pub registration_number: Option<String>,
    #[serde(default)]
    pub member_status: MemberStatus,
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
    #[serde(default)]
    pub guardian_last_name: Option<String>,
    #[serde(default)]
    pub guardian_first_name: Option<String>,
    #[serde(default)]
    pub guardian_tax_code: Option<String>,
    #[serde(default)]
    pub guardian_phone: Option<String>,
    #[serde(default)]
    pub guardian_email: Option<String>,
    #[serde(default)]
    pub guardian_relationship: Option<String>,
}

/// Whitelisted query-string filters for the junior member list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JuniorMemberFilter {
    #[serde(default, deserialize_with = "super::forms::option_variant")]
    pub status: Option<MemberStatus>,
    #[serde(default)]
    pub search: Option<String>,
}
