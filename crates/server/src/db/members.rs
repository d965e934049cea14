//! Repository for the adult member registry.

use sqlx::{PgPool, Postgres, QueryBuilder};

use easyvol_core::{FiscalCode, MemberId, MemberStatus, UserId};

use super::pagination::{Page, Pagination};
use super::RepositoryError;
use crate::models::member::{Member, MemberFilter, MemberPayload};

const MEMBER_COLUMNS: &str = "id, registration_number, member_type, member_status, \
     volunteer_status, last_name, first_name, birth_date, birth_place, birth_province, \
     tax_code, gender, nationality, registration_date, created_at, created_by, \
     updated_at, updated_by";

/// Repository for member database operations.
pub struct MemberRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MemberRepository<'a> {
    /// Create a new member repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List members matching the filter, one page at a time, ordered by
    /// last name then first name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &MemberFilter,
        pagination: Pagination,
    ) -> Result<Page<Member>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE 1=1"
        ));
        push_filter(&mut query, filter);
        query.push(" ORDER BY last_name, first_name");
        query.push(" LIMIT ").push_bind(pagination.limit());
        query.push(" OFFSET ").push_bind(pagination.offset());

        let items = query
            .build_query_as::<Member>()
            .fetch_all(self.pool)
            .await?;
        let total = self.count(filter).await?;

        Ok(Page::new(items, total, pagination))
    }

    /// Count members matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, filter: &MemberFilter) -> Result<i64, RepositoryError> {
        let mut query =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM members WHERE 1=1");
        push_filter(&mut query, filter);

        let total: i64 = query.build_query_scalar().fetch_one(self.pool).await?;
        Ok(total)
    }

    /// Fetch one member by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such member exists.
    pub async fn get(&self, id: MemberId) -> Result<Member, RepositoryError> {
        sqlx::query_as::<_, Member>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Create a member. Generates the next matricola when the payload does
    /// not carry one and validates the fiscal code when present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for an invalid fiscal code and
    /// `RepositoryError::Conflict` on a duplicate matricola.
    pub async fn create(
        &self,
        payload: &MemberPayload,
        created_by: UserId,
    ) -> Result<Member, RepositoryError> {
        validate_tax_code(payload.tax_code.as_deref())?;

        let mut tx = self.pool.begin().await?;

        let registration_number = match &payload.registration_number {
            Some(n) if !n.is_empty() => n.clone(),
            _ => {
                let max: Option<i32> = sqlx::query_scalar(
                    "SELECT MAX(CAST(registration_number AS integer))
                     FROM members
                     WHERE registration_number ~ '^[0-9]+$'",
                )
                .fetch_one(&mut *tx)
                .await?;
                format!("{:06}", max.unwrap_or(0) + 1)
            }
        };

        let member = sqlx::query_as::<_, Member>(&format!(
            "INSERT INTO members (
                registration_number, member_type, member_status, volunteer_status,
                last_name, first_name, birth_date, birth_place, birth_province,
                tax_code, gender, nationality, registration_date, created_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                      COALESCE($13, CURRENT_DATE), $14)
            RETURNING {MEMBER_COLUMNS}"
        ))
        .bind(&registration_number)
        .bind(payload.member_type)
        .bind(payload.member_status)
        .bind(payload.volunteer_status)
        .bind(&payload.last_name)
        .bind(&payload.first_name)
        .bind(payload.birth_date)
        .bind(&payload.birth_place)
        .bind(&payload.birth_province)
        .bind(normalized_tax_code(payload.tax_code.as_deref()))
        .bind(&payload.gender)
        .bind(payload.nationality.as_deref().unwrap_or("Italiana"))
        .bind(payload.registration_date)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        tx.commit().await?;
        Ok(member)
    }

    /// Update a member in place.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the member does not exist and
    /// `RepositoryError::Validation` for an invalid fiscal code.
    pub async fn update(
        &self,
        id: MemberId,
        payload: &MemberPayload,
        updated_by: UserId,
    ) -> Result<Member, RepositoryError> {
        validate_tax_code(payload.tax_code.as_deref())?;

        sqlx::query_as::<_, Member>(&format!(
            "UPDATE members SET
                member_type = $2, member_status = $3, volunteer_status = $4,
                last_name = $5, first_name = $6, birth_date = $7,
                birth_place = $8, birth_province = $9, tax_code = $10,
                gender = $11, nationality = $12,
                updated_at = NOW(), updated_by = $13
             WHERE id = $1
             RETURNING {MEMBER_COLUMNS}"
        ))
        .bind(id)
        .bind(payload.member_type)
        .bind(payload.member_status)
        .bind(payload.volunteer_status)
        .bind(&payload.last_name)
        .bind(&payload.first_name)
        .bind(payload.birth_date)
        .bind(&payload.birth_place)
        .bind(&payload.birth_province)
        .bind(normalized_tax_code(payload.tax_code.as_deref()))
        .bind(&payload.gender)
        .bind(payload.nationality.as_deref().unwrap_or("Italiana"))
        .bind(updated_by)
        .fetch_optional(self.pool)
        .await
        .map_err(map_unique_violation)?
        .ok_or(RepositoryError::NotFound)
    }

    /// Soft-delete: mark the member resigned instead of removing the row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the member does not exist.
    pub async fn delete(&self, id: MemberId, updated_by: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE members
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

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &MemberFilter) {
    if let Some(status) = filter.status {
        query.push(" AND member_status = ").push_bind(status);
    }
    if let Some(vs) = filter.volunteer_status {
        query.push(" AND volunteer_status = ").push_bind(vs);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        query
            .push(" AND (last_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR first_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR registration_number ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR tax_code ILIKE ")
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

fn normalized_tax_code(tax_code: Option<&str>) -> Option<String> {
    tax_code
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
}

fn map_unique_violation(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict("matricola già esistente".to_string());
        }
    }
    RepositoryError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_code_validation_accepts_empty_and_valid() {
        assert!(validate_tax_code(None).is_ok());
        assert!(validate_tax_code(Some("")).is_ok());
        assert!(validate_tax_code(Some("RSSMRA85T10A562S")).is_ok());
    }

    #[test]
    fn tax_code_validation_rejects_bad_checksum() {
        assert!(validate_tax_code(Some("RSSMRA85T10A562X")).is_err());
        assert!(validate_tax_code(Some("troppo-corto")).is_err());
    }

    #[test]
    fn tax_code_is_uppercased_before_storage() {
        assert_eq!(
            normalized_tax_code(Some("rssmra85t10a562s")).as_deref(),
            Some("RSSMRA85T10A562S")
        );
        assert_eq!(normalized_tax_code(Some("  ")), None);
    }
}
