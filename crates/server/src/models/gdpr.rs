//! GDPR records: controller appointments, privacy consents and the data
//! processing registry.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use easyvol_core::{AppointmentId, ConsentId, MemberId, RegistryEntryId, UserId};

/// Appointment of an internal person (or external one) as data controller
/// or processor.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ControllerAppointment {
    pub id: AppointmentId,
    /// Internal user, when the appointee is an application account.
    pub user_id: Option<UserId>,
    /// Internal member, when the appointee is in the registry.
    pub member_id: Option<MemberId>,
    pub external_person_name: Option<String>,
    pub external_person_surname: Option<String>,
    pub external_person_tax_code: Option<String>,
    /// "titolare", "responsabile", "incaricato".
    pub appointment_type: String,
    pub appointment_date: NaiveDate,
    pub revocation_date: Option<NaiveDate>,
    pub is_active: bool,
    pub scope: Option<String>,
    pub responsibilities: Option<String>,
    pub training_completed: bool,
    pub training_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
}

/// Form payload for a controller appointment.
#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentPayload {
    #[serde(default, deserialize_with = "super::forms::option_id")]
    pub user_id: Option<UserId>,
    #[serde(default, deserialize_with = "super::forms::option_id")]
    pub member_id: Option<MemberId>,
    #[serde(default)]
    pub external_person_name: Option<String>,
    #[serde(default)]
    pub external_person_surname: Option<String>,
    #[serde(default)]
    pub external_person_tax_code: Option<String>,
    pub appointment_type: String,
    pub appointment_date: NaiveDate,
    #[serde(default, deserialize_with = "super::forms::option_from_str")]
    pub revocation_date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub responsibilities: Option<String>,
    #[serde(default)]
    pub training_completed: bool,
    #[serde(default, deserialize_with = "super::forms::option_from_str")]
    pub training_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

const fn default_true() -> bool {
    true
}

/// A privacy consent recorded for a member or junior member.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Consent {
    pub id: ConsentId,
    /// "member" or "junior_member".
    pub entity_type: String,
    pub entity_id: i32,
    /// "privacy", "foto_video", "newsletter"...
    pub consent_type: String,
    pub consent_given: bool,
    pub consent_date: NaiveDate,
    pub consent_expiry_date: Option<NaiveDate>,
    pub consent_version: Option<String>,
    /// How the consent was collected ("modulo_cartaceo", "online").
    pub consent_method: Option<String>,
    pub revoked: bool,
    pub revoked_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
}

/// Form payload for recording a consent.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsentPayload {
    pub entity_type: String,
    pub entity_id: i32,
    pub consent_type: String,
    #[serde(default)]
    pub consent_given: bool,
    pub consent_date: NaiveDate,
    #[serde(default, deserialize_with = "super::forms::option_from_str")]
    pub consent_expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub consent_version: Option<String>,
    #[serde(default)]
    pub consent_method: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One entry of the GDPR data processing registry (art. 30 record).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RegistryEntry {
    pub id: RegistryEntryId,
    pub processing_name: String,
    /// Mandatory: create/update without it is rejected before any write.
    pub processing_purpose: String,
    pub data_categories: String,
    pub data_subjects: String,
    pub recipients: Option<String>,
    pub third_country_transfer: bool,
    pub third_country_details: Option<String>,
    pub retention_period: Option<String>,
    pub security_measures: Option<String>,
    pub legal_basis: Option<String>,
    pub data_controller: Option<String>,
    pub data_processor: Option<String>,
    pub dpo_contact: Option<String>,
    pub is_active: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
}

/// Form payload for a processing registry entry.
///
/// `processing_purpose` stays optional here so the handler can reject the
/// missing case with the fixed Italian message instead of a 422.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryEntryPayload {
    pub processing_name: String,
    #[serde(default)]
    pub processing_purpose: Option<String>,
    pub data_categories: String,
    pub data_subjects: String,
    #[serde(default)]
    pub recipients: Option<String>,
    #[serde(default)]
    pub third_country_transfer: bool,
    #[serde(default)]
    pub third_country_details: Option<String>,
    #[serde(default)]
    pub retention_period: Option<String>,
    #[serde(default)]
    pub security_measures: Option<String>,
    #[serde(default)]
    pub legal_basis: Option<String>,
    #[serde(default)]
    pub data_controller: Option<String>,
    #[serde(default)]
    pub data_processor: Option<String>,
    #[serde(default)]
    pub dpo_contact: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub notes: Option<String>,
}
