//! Repository for scheduler deadlines.

use sqlx::{PgPool, Postgres, QueryBuilder};

use easyvol_core::{SchedulerItemId, SchedulerStatus};

use super::pagination::{Page, Pagination};
use super::RepositoryError;
use crate::models::scheduler::{SchedulerFilter, SchedulerItem, SchedulerItemPayload};

const ITEM_COLUMNS: &str = "id, title, description, due_date, category, priority, status, \
     reminder_days, assigned_to, completed_at, created_at, updated_at";

/// Repository for scheduler database operations.
pub struct SchedulerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SchedulerRepository<'a> {
    /// Create a new scheduler repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List deadlines matching the filter, soonest due first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &SchedulerFilter,
        pagination: Pagination,
    ) -> Result<Page<SchedulerItem>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {ITEM_COLUMNS} FROM scheduler_items WHERE 1=1"
        ));
        push_filter(&mut query, filter);
        query.push(" ORDER BY due_date, priority DESC");
        query.push(" LIMIT ").push_bind(pagination.limit());
        query.push(" OFFSET ").push_bind(pagination.offset());

        let items = query
            .build_query_as::<SchedulerItem>()
            .fetch_all(self.pool)
            .await?;

        let mut count_query =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM scheduler_items WHERE 1=1");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        Ok(Page::new(items, total, pagination))
    }

    /// Fetch one deadline by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such item exists.
    pub async fn get(&self, id: SchedulerItemId) -> Result<SchedulerItem, RepositoryError> {
        sqlx::query_as::<_, SchedulerItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM scheduler_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Create a deadline.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        payload: &SchedulerItemPayload,
    ) -> Result<SchedulerItem, RepositoryError> {
        let item = sqlx::query_as::<_, SchedulerItem>(&format!(
            "INSERT INTO scheduler_items (title, description, due_date, category,
                                          priority, status, reminder_days, assigned_to)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.due_date)
        .bind(&payload.category)
        .bind(payload.priority)
        .bind(payload.status)
        .bind(payload.reminder_days)
        .bind(payload.assigned_to)
        .fetch_one(self.pool)
        .await?;

        Ok(item)
    }

    /// Update a deadline. Transitioning into `completato` stamps
    /// `completed_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist.
    pub async fn update(
        &self,
        id: SchedulerItemId,
        payload: &SchedulerItemPayload,
    ) -> Result<SchedulerItem, RepositoryError> {
        sqlx::query_as::<_, SchedulerItem>(&format!(
            "UPDATE scheduler_items SET
                title = $2, description = $3, due_date = $4, category = $5,
                priority = $6, status = $7, reminder_days = $8, assigned_to = $9,
                completed_at = CASE
                    WHEN $7 = 'completato'::scheduler_status AND completed_at IS NULL THEN NOW()
                    WHEN $7 <> 'completato'::scheduler_status THEN NULL
                    ELSE completed_at
                END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.due_date)
        .bind(&payload.category)
        .bind(payload.priority)
        .bind(payload.status)
        .bind(payload.reminder_days)
        .bind(payload.assigned_to)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Mark a deadline completed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist.
    pub async fn complete(&self, id: SchedulerItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE scheduler_items
             SET status = $2, completed_at = NOW(), updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(SchedulerStatus::Completato)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a deadline.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist.
    pub async fn delete(&self, id: SchedulerItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM scheduler_items WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Sweep open items past their due date into `scaduto`. Returns the
    /// number of rows touched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_overdue(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE scheduler_items
             SET status = $1, updated_at = NOW()
             WHERE status IN ($2, $3) AND due_date < CURRENT_DATE",
        )
        .bind(SchedulerStatus::Scaduto)
        .bind(SchedulerStatus::InAttesa)
        .bind(SchedulerStatus::InCorso)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Open items inside their reminder window, for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upcoming(&self, limit: i64) -> Result<Vec<SchedulerItem>, RepositoryError> {
        let items = sqlx::query_as::<_, SchedulerItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM scheduler_items
             WHERE status IN ($1, $2)
               AND due_date <= CURRENT_DATE + (reminder_days || ' days')::interval
             ORDER BY due_date
             LIMIT $3"
        ))
        .bind(SchedulerStatus::InAttesa)
        .bind(SchedulerStatus::InCorso)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &SchedulerFilter) {
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status);
    }
    if let Some(priority) = filter.priority {
        query.push(" AND priority = ").push_bind(priority);
    }
    if let Some(category) = filter.category.as_deref().filter(|s| !s.is_empty()) {
        query
            .push(" AND category = ")
            .push_bind(category.to_string());
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        query
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
