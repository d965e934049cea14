//! Repository for the single-row association record.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::association::AssociationInfo;

/// Repository for the association letterhead row.
pub struct AssociationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AssociationRepository<'a> {
    /// Create a new association repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the association record, if configured.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self) -> Result<Option<AssociationInfo>, RepositoryError> {
        let info = sqlx::query_as::<_, AssociationInfo>(
            "SELECT name, address, city, province, postal_code, tax_code, email, phone
             FROM association
             LIMIT 1",
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(info)
    }

    /// Replace the association record (insert when missing).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    pub async fn upsert(&self, info: &AssociationInfo) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO association (id, name, address, city, province, postal_code, tax_code, email, phone)
             VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (id) DO UPDATE SET
                 name = EXCLUDED.name,
                 address = EXCLUDED.address,
                 city = EXCLUDED.city,
                 province = EXCLUDED.province,
                 postal_code = EXCLUDED.postal_code,
                 tax_code = EXCLUDED.tax_code,
                 email = EXCLUDED.email,
                 phone = EXCLUDED.phone",
        )
        .bind(&info.name)
        .bind(&info.address)
        .bind(&info.city)
        .bind(&info.province)
        .bind(&info.postal_code)
        .bind(&info.tax_code)
        .bind(&info.email)
        .bind(&info.phone)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
