//! Repository for database-backed print templates.
//!
//! Templates live primarily as `.json` files under the configured templates
//! directory; rows in `print_templates` are the legacy storage the CLI can
//! export to files.

use serde_json::Value;
use sqlx::PgPool;

use easyvol_core::PrintTemplateId;

use super::RepositoryError;

/// A stored print template row: metadata plus the JSON layout document.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PrintTemplateRecord {
    pub id: PrintTemplateId,
    pub name: String,
    pub description: Option<String>,
    /// Which registry the template renders ("members", "events"...).
    pub entity_type: String,
    /// The full layout document, same shape as the file-backed templates.
    pub document: Value,
    pub is_active: bool,
}

/// Repository for print template database operations.
pub struct PrintTemplateRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PrintTemplateRepository<'a> {
    /// Create a new print template repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active templates for one entity type, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_entity(
        &self,
        entity_type: &str,
    ) -> Result<Vec<PrintTemplateRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, PrintTemplateRecord>(
            "SELECT id, name, description, entity_type, document, is_active
             FROM print_templates
             WHERE entity_type = $1 AND is_active
             ORDER BY name",
        )
        .bind(entity_type)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// List every template row, for the CLI export.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<PrintTemplateRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, PrintTemplateRecord>(
            "SELECT id, name, description, entity_type, document, is_active
             FROM print_templates
             ORDER BY entity_type, name",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Fetch one template row by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such template exists.
    pub async fn get(&self, id: PrintTemplateId) -> Result<PrintTemplateRecord, RepositoryError> {
        sqlx::query_as::<_, PrintTemplateRecord>(
            "SELECT id, name, description, entity_type, document, is_active
             FROM print_templates
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Store a template document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        entity_type: &str,
        document: &Value,
    ) -> Result<PrintTemplateRecord, RepositoryError> {
        let record = sqlx::query_as::<_, PrintTemplateRecord>(
            "INSERT INTO print_templates (name, description, entity_type, document, is_active)
             VALUES ($1, $2, $3, $4, TRUE)
             RETURNING id, name, description, entity_type, document, is_active",
        )
        .bind(name)
        .bind(description)
        .bind(entity_type)
        .bind(document)
        .fetch_one(self.pool)
        .await?;
        Ok(record)
    }

    /// Deactivate a template row, typically after exporting it to a file.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the template does not exist.
    pub async fn deactivate(&self, id: PrintTemplateId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE print_templates SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
