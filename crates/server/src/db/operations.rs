//! Repository for operations-center resources: radio directory, radio
//! assignments and the on-call roster.

use sqlx::{PgPool, Postgres, QueryBuilder};

use easyvol_core::{MemberId, OnCallShiftId, RadioId, RadioStatus, UserId};

use super::RepositoryError;
use crate::models::operations::{
    ActiveAssignment, OnCallShift, OnCallShiftPayload, Radio, RadioPayload, RosterShift,
};

const RADIO_COLUMNS: &str = "id, name, identifier, device_type, brand, model, serial_number, \
     status, notes, created_at, updated_at";

/// Repository for operations-center database operations.
pub struct OperationsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OperationsRepository<'a> {
    /// Create a new operations repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Radio directory
    // =========================================================================

    /// List the whole radio directory, optionally narrowed to one status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_radios(
        &self,
        status: Option<RadioStatus>,
    ) -> Result<Vec<Radio>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {RADIO_COLUMNS} FROM radio_directory WHERE 1=1"
        ));
        if let Some(status) = status {
            query.push(" AND status = ").push_bind(status);
        }
        query.push(" ORDER BY name");

        let radios = query.build_query_as::<Radio>().fetch_all(self.pool).await?;
        Ok(radios)
    }

    /// Fetch one radio by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such radio exists.
    pub async fn get_radio(&self, id: RadioId) -> Result<Radio, RepositoryError> {
        sqlx::query_as::<_, Radio>(&format!(
            "SELECT {RADIO_COLUMNS} FROM radio_directory WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Create a radio.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate serial number.
    pub async fn create_radio(&self, payload: &RadioPayload) -> Result<Radio, RepositoryError> {
        sqlx::query_as::<_, Radio>(&format!(
            "INSERT INTO radio_directory (name, identifier, device_type, brand, model,
                                          serial_number, status, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {RADIO_COLUMNS}"
        ))
        .bind(&payload.name)
        .bind(&payload.identifier)
        .bind(&payload.device_type)
        .bind(&payload.brand)
        .bind(&payload.model)
        .bind(&payload.serial_number)
        .bind(payload.status)
        .bind(&payload.notes)
        .fetch_one(self.pool)
        .await
        .map_err(map_unique_violation)
    }

    /// Update a radio in place.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the radio does not exist.
    pub async fn update_radio(
        &self,
        id: RadioId,
        payload: &RadioPayload,
    ) -> Result<Radio, RepositoryError> {
        sqlx::query_as::<_, Radio>(&format!(
            "UPDATE radio_directory SET name = $2, identifier = $3, device_type = $4,
                 brand = $5, model = $6, serial_number = $7, status = $8, notes = $9,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {RADIO_COLUMNS}"
        ))
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.identifier)
        .bind(&payload.device_type)
        .bind(&payload.brand)
        .bind(&payload.model)
        .bind(&payload.serial_number)
        .bind(payload.status)
        .bind(&payload.notes)
        .fetch_optional(self.pool)
        .await
        .map_err(map_unique_violation)?
        .ok_or(RepositoryError::NotFound)
    }

    /// Hand a radio to a volunteer: records the assignment and flips the
    /// device status, atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the radio is not available
    /// and `RepositoryError::NotFound` when the volunteer does not exist.
    pub async fn assign_radio(
        &self,
        radio_id: RadioId,
        member_id: MemberId,
        assigned_by: UserId,
        notes: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let status: RadioStatus =
            sqlx::query_scalar("SELECT status FROM radio_directory WHERE id = $1 FOR UPDATE")
                .bind(radio_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(RepositoryError::NotFound)?;

        if status != RadioStatus::Disponibile {
            return Err(RepositoryError::Conflict(
                "radio non disponibile".to_string(),
            ));
        }

        let names: Option<(String, String)> =
            sqlx::query_as("SELECT first_name, last_name FROM members WHERE id = $1")
                .bind(member_id)
                .fetch_optional(&mut *tx)
                .await?;
        let (first_name, last_name) = names.ok_or(RepositoryError::NotFound)?;

        sqlx::query(
            "INSERT INTO radio_assignments
                 (radio_id, member_id, assignee_first_name, assignee_last_name,
                  assigned_by, notes)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(radio_id)
        .bind(member_id)
        .bind(&first_name)
        .bind(&last_name)
        .bind(assigned_by)
        .bind(notes)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE radio_directory SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(radio_id)
            .bind(RadioStatus::Assegnata)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Take a radio back: closes the open assignment and frees the device,
    /// atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the radio has no open
    /// assignment.
    pub async fn return_radio(&self, radio_id: RadioId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE radio_assignments SET returned_at = NOW()
             WHERE radio_id = $1 AND returned_at IS NULL",
        )
        .bind(radio_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("UPDATE radio_directory SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(radio_id)
            .bind(RadioStatus::Disponibile)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Open assignments joined with device data, for the status snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn active_assignments(&self) -> Result<Vec<ActiveAssignment>, RepositoryError> {
        let rows = sqlx::query_as::<_, ActiveAssignment>(
            "SELECT ra.radio_id, rd.name AS radio_name, rd.identifier,
                    ra.member_id, ra.assignee_first_name, ra.assignee_last_name,
                    ra.assignment_date
             FROM radio_assignments ra
             INNER JOIN radio_directory rd ON rd.id = ra.radio_id
             WHERE ra.returned_at IS NULL
             ORDER BY rd.name",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Number of radios free for assignment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_available_radios(&self) -> Result<i64, RepositoryError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM radio_directory WHERE status = $1")
                .bind(RadioStatus::Disponibile)
                .fetch_one(self.pool)
                .await?;
        Ok(total)
    }

    // =========================================================================
    // On-call roster
    // =========================================================================

    /// Shifts overlapping the current moment plus the coming week, joined
    /// with the volunteer's name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn current_roster(&self) -> Result<Vec<RosterShift>, RepositoryError> {
        let rows = sqlx::query_as::<_, RosterShift>(
            "SELECT ocs.id, ocs.member_id, m.first_name, m.last_name,
                    ocs.start_datetime, ocs.end_datetime
             FROM on_call_schedule ocs
             INNER JOIN members m ON m.id = ocs.member_id
             WHERE ocs.end_datetime >= NOW()
               AND ocs.start_datetime <= NOW() + INTERVAL '7 days'
             ORDER BY ocs.start_datetime",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Add an on-call shift. Overlapping shifts for the same volunteer are
    /// rejected.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on an overlap and
    /// `RepositoryError::Validation` when the shift ends before it starts.
    pub async fn add_shift(
        &self,
        payload: &OnCallShiftPayload,
        created_by: UserId,
    ) -> Result<OnCallShift, RepositoryError> {
        if payload.end_datetime <= payload.start_datetime {
            return Err(RepositoryError::Validation(
                "il turno deve terminare dopo l'inizio".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let overlaps: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM on_call_schedule
             WHERE member_id = $1
               AND start_datetime < $3
               AND end_datetime > $2",
        )
        .bind(payload.member_id)
        .bind(payload.start_datetime)
        .bind(payload.end_datetime)
        .fetch_one(&mut *tx)
        .await?;

        if overlaps > 0 {
            return Err(RepositoryError::Conflict(
                "turno sovrapposto a uno esistente".to_string(),
            ));
        }

        let shift = sqlx::query_as::<_, OnCallShift>(
            "INSERT INTO on_call_schedule (member_id, start_datetime, end_datetime, notes, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, member_id, start_datetime, end_datetime, notes, created_by",
        )
        .bind(payload.member_id)
        .bind(payload.start_datetime)
        .bind(payload.end_datetime)
        .bind(&payload.notes)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(shift)
    }

    /// Remove an on-call shift.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shift does not exist.
    pub async fn delete_shift(&self, id: OnCallShiftId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM on_call_schedule WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

fn map_unique_violation(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict("numero di serie già presente".to_string());
        }
    }
    RepositoryError::Database(err)
}
