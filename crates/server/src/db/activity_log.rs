//! Repository for the activity log.

use sqlx::{PgPool, Postgres, QueryBuilder};

use super::pagination::{Page, Pagination};
use super::RepositoryError;
use crate::models::activity::{ActivityEntry, ActivityFilter, ActivityLogEntry};

/// Repository for activity log database operations.
pub struct ActivityLogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ActivityLogRepository<'a> {
    /// Create a new activity log repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append one audit row. Failures are surfaced to the caller, which
    /// logs and continues: a lost audit row never aborts the user's action.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record(&self, entry: &ActivityEntry) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO activity_logs
                 (user_id, module, action, record_id, description, ip_address, user_agent)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.user_id)
        .bind(entry.module)
        .bind(entry.action)
        .bind(entry.record_id)
        .bind(&entry.description)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// List audit rows matching the filter, newest first, with the username
    /// resolved for display.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &ActivityFilter,
        pagination: Pagination,
    ) -> Result<Page<ActivityLogEntry>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT al.id, al.user_id, u.username, al.module, al.action, al.record_id,
                    al.description, al.ip_address, al.user_agent, al.created_at
             FROM activity_logs al
             LEFT JOIN users u ON u.id = al.user_id
             WHERE 1=1",
        );
        push_filter(&mut query, filter);
        query.push(" ORDER BY al.created_at DESC");
        query.push(" LIMIT ").push_bind(pagination.limit());
        query.push(" OFFSET ").push_bind(pagination.offset());

        let items = query
            .build_query_as::<ActivityLogEntry>()
            .fetch_all(self.pool)
            .await?;

        let mut count_query = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM activity_logs al WHERE 1=1",
        );
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        Ok(Page::new(items, total, pagination))
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &ActivityFilter) {
    if let Some(module) = filter.module.as_deref().filter(|s| !s.is_empty()) {
        query.push(" AND al.module = ").push_bind(module.to_string());
    }
    if let Some(user_id) = filter.user_id {
        query.push(" AND al.user_id = ").push_bind(user_id);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        query.push(" AND al.description ILIKE ").push_bind(pattern);
    }
}
