//! Repository for newsletters and their recipient lists.

use sqlx::{PgPool, Postgres, QueryBuilder};

use easyvol_core::{NewsletterId, NewsletterStatus, UserId};

use super::pagination::{Page, Pagination};
use super::RepositoryError;
use crate::models::newsletter::{
    Newsletter, NewsletterFilter, NewsletterPayload, NewsletterRecipient,
};

const NEWSLETTER_COLUMNS: &str = "id, subject, body_html, reply_to, status, scheduled_at, \
     sent_at, sent_count, created_at, created_by";

/// Repository for newsletter database operations.
pub struct NewsletterRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NewsletterRepository<'a> {
    /// Create a new newsletter repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List newsletters matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &NewsletterFilter,
        pagination: Pagination,
    ) -> Result<Page<Newsletter>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {NEWSLETTER_COLUMNS} FROM newsletters WHERE 1=1"
        ));
        push_filter(&mut query, filter);
        query.push(" ORDER BY created_at DESC");
        query.push(" LIMIT ").push_bind(pagination.limit());
        query.push(" OFFSET ").push_bind(pagination.offset());

        let items = query
            .build_query_as::<Newsletter>()
            .fetch_all(self.pool)
            .await?;

        let mut count_query =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM newsletters WHERE 1=1");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        Ok(Page::new(items, total, pagination))
    }

    /// Fetch one newsletter by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such newsletter exists.
    pub async fn get(&self, id: NewsletterId) -> Result<Newsletter, RepositoryError> {
        sqlx::query_as::<_, Newsletter>(&format!(
            "SELECT {NEWSLETTER_COLUMNS} FROM newsletters WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Create a draft newsletter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        payload: &NewsletterPayload,
        created_by: UserId,
    ) -> Result<Newsletter, RepositoryError> {
        let newsletter = sqlx::query_as::<_, Newsletter>(&format!(
            "INSERT INTO newsletters (subject, body_html, reply_to, status, scheduled_at, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {NEWSLETTER_COLUMNS}"
        ))
        .bind(&payload.subject)
        .bind(&payload.body_html)
        .bind(&payload.reply_to)
        .bind(NewsletterStatus::Draft)
        .bind(payload.scheduled_at)
        .bind(created_by)
        .fetch_one(self.pool)
        .await?;

        Ok(newsletter)
    }

    /// Update a newsletter while it is still a draft. Sent newsletters are
    /// immutable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the newsletter does not
    /// exist or is no longer a draft.
    pub async fn update_draft(
        &self,
        id: NewsletterId,
        payload: &NewsletterPayload,
    ) -> Result<Newsletter, RepositoryError> {
        sqlx::query_as::<_, Newsletter>(&format!(
            "UPDATE newsletters
             SET subject = $2, body_html = $3, reply_to = $4, scheduled_at = $5
             WHERE id = $1 AND status = $6
             RETURNING {NEWSLETTER_COLUMNS}"
        ))
        .bind(id)
        .bind(&payload.subject)
        .bind(&payload.body_html)
        .bind(&payload.reply_to)
        .bind(payload.scheduled_at)
        .bind(NewsletterStatus::Draft)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a newsletter while it is still a draft.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the newsletter does not
    /// exist or is no longer a draft.
    pub async fn delete_draft(&self, id: NewsletterId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM newsletters WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(NewsletterStatus::Draft)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Addresses of active members who have an email contact, as the send
    /// targets.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn active_member_addresses(
        &self,
    ) -> Result<Vec<(String, String)>, RepositoryError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT mc.value, m.last_name || ' ' || m.first_name
             FROM members m
             INNER JOIN member_contacts mc
                 ON m.id = mc.member_id AND mc.contact_type = 'email'
             WHERE m.member_status = 'attivo'
             ORDER BY m.last_name, m.first_name",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Record the recipients of a send and mark the newsletter sent, in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the newsletter is not a
    /// draft anymore (double-send guard).
    pub async fn mark_sent(
        &self,
        id: NewsletterId,
        recipients: &[(String, Option<String>)],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let sent_count = recipients.len() as i32;
        let result = sqlx::query(
            "UPDATE newsletters
             SET status = $2, sent_at = NOW(), sent_count = $3
             WHERE id = $1 AND status = $4",
        )
        .bind(id)
        .bind(NewsletterStatus::Sent)
        .bind(sent_count)
        .bind(NewsletterStatus::Draft)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        for (email, name) in recipients {
            sqlx::query(
                "INSERT INTO newsletter_recipients
                     (newsletter_id, email, recipient_name, recipient_type, status)
                 VALUES ($1, $2, $3, 'member', 'sent')",
            )
            .bind(id)
            .bind(email)
            .bind(name)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Recipient list of a newsletter, for the detail page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recipients(
        &self,
        id: NewsletterId,
    ) -> Result<Vec<NewsletterRecipient>, RepositoryError> {
        let rows = sqlx::query_as::<_, NewsletterRecipient>(
            "SELECT id, newsletter_id, email, recipient_name, recipient_type, status
             FROM newsletter_recipients
             WHERE newsletter_id = $1
             ORDER BY email",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &NewsletterFilter) {
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        query.push(" AND subject ILIKE ").push_bind(pattern);
    }
}
