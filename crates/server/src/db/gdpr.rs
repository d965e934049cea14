//! Repository for GDPR records: controller appointments, privacy consents
//! and the data processing registry.

use sqlx::PgPool;

use easyvol_core::{AppointmentId, ConsentId, RegistryEntryId, UserId};

use super::pagination::{Page, Pagination};
use super::RepositoryError;
use crate::models::gdpr::{
    AppointmentPayload, Consent, ConsentPayload, ControllerAppointment, RegistryEntry,
    RegistryEntryPayload,
};

/// Fixed message shown when a processing registry entry is missing its
/// purpose. Checked before any row is written.
pub const MISSING_PURPOSE_MESSAGE: &str = "La finalità del trattamento è obbligatoria";

const APPOINTMENT_COLUMNS: &str = "id, user_id, member_id, external_person_name, \
     external_person_surname, external_person_tax_code, appointment_type, appointment_date, \
     revocation_date, is_active, scope, responsibilities, training_completed, training_date, \
     notes, created_at, created_by";

const CONSENT_COLUMNS: &str = "id, entity_type, entity_id, consent_type, consent_given, \
     consent_date, consent_expiry_date, consent_version, consent_method, revoked, \
     revoked_date, notes, created_at, created_by";

const REGISTRY_COLUMNS: &str = "id, processing_name, processing_purpose, data_categories, \
     data_subjects, recipients, third_country_transfer, third_country_details, \
     retention_period, security_measures, legal_basis, data_controller, data_processor, \
     dpo_contact, is_active, notes, created_at, created_by";

/// Repository for GDPR database operations.
pub struct GdprRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GdprRepository<'a> {
    /// Create a new GDPR repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Controller appointments
    // =========================================================================

    /// List appointments, active first, newest within each group.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_appointments(
        &self,
        pagination: Pagination,
    ) -> Result<Page<ControllerAppointment>, RepositoryError> {
        let items = sqlx::query_as::<_, ControllerAppointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM data_controller_appointments
             ORDER BY is_active DESC, appointment_date DESC
             LIMIT $1 OFFSET $2"
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM data_controller_appointments")
            .fetch_one(self.pool)
            .await?;

        Ok(Page::new(items, total, pagination))
    }

    /// Record an appointment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_appointment(
        &self,
        payload: &AppointmentPayload,
        created_by: UserId,
    ) -> Result<ControllerAppointment, RepositoryError> {
        let appointment = sqlx::query_as::<_, ControllerAppointment>(&format!(
            "INSERT INTO data_controller_appointments (
                user_id, member_id, external_person_name, external_person_surname,
                external_person_tax_code, appointment_type, appointment_date,
                revocation_date, is_active, scope, responsibilities,
                training_completed, training_date, notes, created_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(payload.user_id)
        .bind(payload.member_id)
        .bind(&payload.external_person_name)
        .bind(&payload.external_person_surname)
        .bind(&payload.external_person_tax_code)
        .bind(&payload.appointment_type)
        .bind(payload.appointment_date)
        .bind(payload.revocation_date)
        .bind(payload.is_active)
        .bind(&payload.scope)
        .bind(&payload.responsibilities)
        .bind(payload.training_completed)
        .bind(payload.training_date)
        .bind(&payload.notes)
        .bind(created_by)
        .fetch_one(self.pool)
        .await?;

        Ok(appointment)
    }

    /// Revoke an appointment: set the revocation date and clear the active
    /// flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the appointment does not exist.
    pub async fn revoke_appointment(&self, id: AppointmentId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE data_controller_appointments
             SET is_active = FALSE, revocation_date = CURRENT_DATE
             WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    // Consents
    // =========================================================================

    /// List consents recorded for one registry entity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn consents_for_entity(
        &self,
        entity_type: &str,
        entity_id: i32,
    ) -> Result<Vec<Consent>, RepositoryError> {
        let consents = sqlx::query_as::<_, Consent>(&format!(
            "SELECT {CONSENT_COLUMNS} FROM privacy_consents
             WHERE entity_type = $1 AND entity_id = $2
             ORDER BY consent_date DESC"
        ))
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(self.pool)
        .await?;
        Ok(consents)
    }

    /// List all consents, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_consents(
        &self,
        pagination: Pagination,
    ) -> Result<Page<Consent>, RepositoryError> {
        let items = sqlx::query_as::<_, Consent>(&format!(
            "SELECT {CONSENT_COLUMNS} FROM privacy_consents
             ORDER BY consent_date DESC
             LIMIT $1 OFFSET $2"
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM privacy_consents")
            .fetch_one(self.pool)
            .await?;

        Ok(Page::new(items, total, pagination))
    }

    /// Record a consent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_consent(
        &self,
        payload: &ConsentPayload,
        created_by: UserId,
    ) -> Result<Consent, RepositoryError> {
        let consent = sqlx::query_as::<_, Consent>(&format!(
            "INSERT INTO privacy_consents (
                entity_type, entity_id, consent_type, consent_given, consent_date,
                consent_expiry_date, consent_version, consent_method, notes, created_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {CONSENT_COLUMNS}"
        ))
        .bind(&payload.entity_type)
        .bind(payload.entity_id)
        .bind(&payload.consent_type)
        .bind(payload.consent_given)
        .bind(payload.consent_date)
        .bind(payload.consent_expiry_date)
        .bind(&payload.consent_version)
        .bind(&payload.consent_method)
        .bind(&payload.notes)
        .bind(created_by)
        .fetch_one(self.pool)
        .await?;

        Ok(consent)
    }

    /// Revoke a consent as of today.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the consent does not exist.
    pub async fn revoke_consent(&self, id: ConsentId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE privacy_consents
             SET revoked = TRUE, revoked_date = CURRENT_DATE
             WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    // Data processing registry
    // =========================================================================

    /// List processing registry entries, active first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_registry(
        &self,
        pagination: Pagination,
    ) -> Result<Page<RegistryEntry>, RepositoryError> {
        let items = sqlx::query_as::<_, RegistryEntry>(&format!(
            "SELECT {REGISTRY_COLUMNS} FROM data_processing_registry
             ORDER BY is_active DESC, processing_name
             LIMIT $1 OFFSET $2"
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM data_processing_registry")
            .fetch_one(self.pool)
            .await?;

        Ok(Page::new(items, total, pagination))
    }

    /// Fetch one registry entry by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such entry exists.
    pub async fn get_registry_entry(
        &self,
        id: RegistryEntryId,
    ) -> Result<RegistryEntry, RepositoryError> {
        sqlx::query_as::<_, RegistryEntry>(&format!(
            "SELECT {REGISTRY_COLUMNS} FROM data_processing_registry WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Create a processing registry entry. The purpose is mandatory; the
    /// check runs before any SQL so a rejected payload writes nothing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` with the fixed Italian message
    /// when `processing_purpose` is missing or blank.
    pub async fn create_registry_entry(
        &self,
        payload: &RegistryEntryPayload,
        created_by: UserId,
    ) -> Result<RegistryEntry, RepositoryError> {
        let purpose = require_purpose(payload)?;

        let entry = sqlx::query_as::<_, RegistryEntry>(&format!(
            "INSERT INTO data_processing_registry (
                processing_name, processing_purpose, data_categories, data_subjects,
                recipients, third_country_transfer, third_country_details,
                retention_period, security_measures, legal_basis, data_controller,
                data_processor, dpo_contact, is_active, notes, created_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {REGISTRY_COLUMNS}"
        ))
        .bind(&payload.processing_name)
        .bind(purpose)
        .bind(&payload.data_categories)
        .bind(&payload.data_subjects)
        .bind(&payload.recipients)
        .bind(payload.third_country_transfer)
        .bind(&payload.third_country_details)
        .bind(&payload.retention_period)
        .bind(&payload.security_measures)
        .bind(&payload.legal_basis)
        .bind(&payload.data_controller)
        .bind(&payload.data_processor)
        .bind(&payload.dpo_contact)
        .bind(payload.is_active)
        .bind(&payload.notes)
        .bind(created_by)
        .fetch_one(self.pool)
        .await?;

        Ok(entry)
    }

    /// Update a processing registry entry, with the same purpose check as
    /// create.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` when the purpose is missing and
    /// `RepositoryError::NotFound` if the entry does not exist.
    pub async fn update_registry_entry(
        &self,
        id: RegistryEntryId,
        payload: &RegistryEntryPayload,
    ) -> Result<RegistryEntry, RepositoryError> {
        let purpose = require_purpose(payload)?;

        sqlx::query_as::<_, RegistryEntry>(&format!(
            "UPDATE data_processing_registry SET
                processing_name = $2, processing_purpose = $3, data_categories = $4,
                data_subjects = $5, recipients = $6, third_country_transfer = $7,
                third_country_details = $8, retention_period = $9,
                security_measures = $10, legal_basis = $11, data_controller = $12,
                data_processor = $13, dpo_contact = $14, is_active = $15, notes = $16
             WHERE id = $1
             RETURNING {REGISTRY_COLUMNS}"
        ))
        .bind(id)
        .bind(&payload.processing_name)
        .bind(purpose)
        .bind(&payload.data_categories)
        .bind(&payload.data_subjects)
        .bind(&payload.recipients)
        .bind(payload.third_country_transfer)
        .bind(&payload.third_country_details)
        .bind(&payload.retention_period)
        .bind(&payload.security_measures)
        .bind(&payload.legal_basis)
        .bind(&payload.data_controller)
        .bind(&payload.data_processor)
        .bind(&payload.dpo_contact)
        .bind(payload.is_active)
        .bind(&payload.notes)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a registry entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry does not exist.
    pub async fn delete_registry_entry(&self, id: RegistryEntryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM data_processing_registry WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

fn require_purpose(payload: &RegistryEntryPayload) -> Result<&str, RepositoryError> {
    payload
        .processing_purpose
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| RepositoryError::Validation(MISSING_PURPOSE_MESSAGE.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(purpose: Option<&str>) -> RegistryEntryPayload {
        RegistryEntryPayload {
            processing_name: "Gestione soci".to_string(),
            processing_purpose: purpose.map(str::to_string),
            data_categories: "anagrafici".to_string(),
            data_subjects: "soci".to_string(),
            recipients: None,
            third_country_transfer: false,
            third_country_details: None,
            retention_period: None,
            security_measures: None,
            legal_basis: None,
            data_controller: None,
            data_processor: None,
            dpo_contact: None,
            is_active: true,
            notes: None,
        }
    }

    #[test]
    fn missing_purpose_rejected_with_fixed_message() {
        let err = require_purpose(&payload(None)).unwrap_err();
        assert_eq!(err.to_string(), MISSING_PURPOSE_MESSAGE);

        let err = require_purpose(&payload(Some("   "))).unwrap_err();
        assert_eq!(err.to_string(), MISSING_PURPOSE_MESSAGE);
    }

    #[test]
    fn present_purpose_passes_through_trimmed() {
        let p = payload(Some("Tenuta del libro soci"));
        assert_eq!(require_purpose(&p).expect("ok"), "Tenuta del libro soci");
    }
}
