//! Repository for the junior member (under-18) registry.

use sqlx::{PgPool, Postgres, QueryBuilder};

use easyvol_core::{FiscalCode, JuniorMemberId, MemberStatus, UserId};

use super::pagination::{Page, Pagination};
use super::RepositoryError;
use crate::models::junior_member::{JuniorMember, JuniorMemberFilter, JuniorMemberPayload};

const JUNIOR_COLUMNS: &str = "id, registration_number, member_status, last_name, first_name, \
     birth_date, birth_place, birth_province, tax_code, gender, nationality, \
     registration_date, guardian_last_name, guardian_first_name, guardian_tax_code, \
     guardian_phone, guardian_email, guardian_relationship, created_at, created_by, \
     updated_at, updated_by";

/// Repository for junior member database operations.
pub struct JuniorMemberRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> JuniorMemberRepository<'a> {
    /// Create a new junior member repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List junior members matching the filter, ordered by last name then
    /// first name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &JuniorMemberFilter,
        pagination: Pagination,
    ) -> Result<Page<JuniorMember>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {JUNIOR_COLUMNS} FROM junior_members WHERE 1=1"
        ));
        push_filter(&mut query, filter);
        query.push(" ORDER BY last_name, first_name");
        query.push(" LIMIT ").push_bind(pagination.limit());
        query.push(" OFFSET ").push_bind(pagination.offset());

        let items = query
            .build_query_as::<JuniorMember>()
            .fetch_all(self.pool)
            .await?;

        let mut count_query = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM junior_members WHERE 1=1",
        );
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        Ok(Page::new(items, total, pagination))
    }

    /// Fetch one junior member by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such row exists.
    pub async fn get(&self, id: JuniorMemberId) -> Result<JuniorMember, RepositoryError> {
        sqlx::query_as::<_, JuniorMember>(&format!(
            "SELECT {JUNIOR_COLUMNS} FROM junior_members WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Create a junior member, auto-generating the matricola when missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for an invalid fiscal code.
    pub async fn create(
        &self,
        payload: &JuniorMemberPayload,
        created_by: UserId,
    ) -> Result<JuniorMember, RepositoryError> {
        validate_tax_code(payload.tax_code.as_deref())?;

        let mut tx = self.pool.begin().await?;

        let registration_number = match &payload.registration_number {
            Some(n) if !n.is_empty() => n.clone(),
            _ => {
                let max: Option<i32> = sqlx::query_scalar(
                    "SELECT MAX(CAST(registration_number AS integer))
                     FROM junior_members
                     WHERE registration_number ~ '^[0-9]+$'",
                )
                .fetch_one(&mut *tx)
                .await?;
                format!("{:06}", max.unwrap_or(0) + 1)
            }
        };

        let junior = sqlx::query_as::<_, JuniorMember>(&format!(
            "INSERT INTO junior_members (
                registration_number, member_status, last_name, first_name,
                birth_date, birth_place, birth_province, tax_code, gender,
                nationality, registration_date, guardian_last_name,
                guardian_first_name, guardian_tax_code, guardian_phone,
                guardian_email, guardian_relationship, created_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                      COALESCE($11, CURRENT_DATE), $12, $13, $14, $15, $16, $17, $18)
            RETURNING {JUNIOR_COLUMNS}"
        ))
        .bind(&registration_number)
        .bind(payload.member_status)
        .bind(&payload.last_name)
        .bind(&payload.first_name)
        .bind(payload.birth_date)
        .bind(&payload.birth_place)
        .bind(&payload.birth_province)
        .bind(payload.tax_code.as_deref().map(str::to_uppercase))
        .bind(&payload.gender)
        .bind(payload.nationality.as_deref().unwrap_or("Italiana"))
        .bind(payload.registration_date)
        .bind(&payload.guardian_last_name)
        .bind(&payload.guardian_first_name)
        .bind(&payload.guardian_tax_code)
        .bind(&payload.guardian_phone)
        .bind(&payload.guardian_email)
        .bind(&payload.guardian_relationship)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(junior)
    }

    /// Update a junior member in place.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row does not exist.
    pub async fn update(
        &self,
        id: JuniorMemberId,
        payload: &JuniorMemberPayload,
        updated_by: UserId,
    ) -> Result<JuniorMember, RepositoryError> {
        validate_tax_code(payload.tax_code.as_deref())?;

        sqlx::query_as::<_, JuniorMember>(&format!(
            "UPDATE junior_members SET
                member_status = $2, last_name = $3, first_name = $4,
                birth_date = $5, birth_place = $6, birth_province = $7,
                tax_code = $8, gender = $9, nationality = $10,
                guardian_last_name = $11, guardian_first_name = $12,
                guardian_tax_code = $13, guardian_phone = $14,
                guardian_email = $15, guardian_relationship = $16,
                updated_at = NOW(), updated_by = $17
             WHERE id = $1
             RETURNING {JUNIOR_COLUMNS}"
        ))
        .bind(id)
        .bind(payload.member_status)
        .bind(&payload.last_name)
        .bind(&payload.first_name)
        .bind(payload.birth_date)
        .bind(&payload.birth_place)
        .bind(&payload.birth_province)
        .bind(payload.tax_code.as_deref().map(str::to_uppercase))
        .bind(&payload.gender)
        .bind(payload.nationality.as_deref().unwrap_or("Italiana"))
        .bind(&payload.guardian_last_name)
        .bind(&payload.guardian_first_name)
        .bind(&payload.guardian_tax_code)
        .bind(&payload.guardian_phone)
        .bind(&payload.guardian_email)
        .bind(&payload.guardian_relationship)
        .bind(updated_by)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Soft-delete: mark the junior member resigned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row does not exist.
    pub async fn delete(
        &self,
        id: JuniorMemberId,
        updated_by: UserId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE junior_members
             SET member_status = $2, updated_at = NOW(), updated_by = $3
             WHERE id = $1",
        )
        .bind(id)
        .bind(MemberStatus::Dimesso)
        .bind(updated_by)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &JuniorMemberFilter) {
    if let Some(status) = filter.status {
        query.push(" AND member_status = ").push_bind(status);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        query
            .push(" AND (last_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR first_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR registration_number ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn validate_tax_code(tax_code: Option<&str>) -> Result<(), RepositoryError> {
    match tax_code {
        Some(code) if !code.trim().is_empty() => FiscalCode::parse(code)
            .map(|_| ())
            .map_err(|e| RepositoryError::Validation(e.to_string())),
        _ => Ok(()),
    }
}
