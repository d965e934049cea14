//! Repository for meetings and their agendas.

use sqlx::{PgPool, Postgres, QueryBuilder};

use easyvol_core::MeetingId;

use super::pagination::{Page, Pagination};
use super::RepositoryError;
use crate::models::meeting::{
    AgendaItem, AgendaItemPayload, Meeting, MeetingDetail, MeetingFilter, MeetingPayload,
};

const MEETING_COLUMNS: &str = "id, meeting_type, progressive_number, meeting_date, location, \
     convocator, description, created_at";

/// Repository for meeting database operations.
pub struct MeetingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MeetingRepository<'a> {
    /// Create a new meeting repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List meetings matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &MeetingFilter,
        pagination: Pagination,
    ) -> Result<Page<Meeting>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {MEETING_COLUMNS} FROM meetings WHERE 1=1"
        ));
        push_filter(&mut query, filter);
        query.push(" ORDER BY meeting_date DESC, id DESC");
        query.push(" LIMIT ").push_bind(pagination.limit());
        query.push(" OFFSET ").push_bind(pagination.offset());

        let items = query
            .build_query_as::<Meeting>()
            .fetch_all(self.pool)
            .await?;

        let mut count_query =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM meetings WHERE 1=1");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        Ok(Page::new(items, total, pagination))
    }

    /// Fetch a meeting with its ordered agenda.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such meeting exists.
    pub async fn get(&self, id: MeetingId) -> Result<MeetingDetail, RepositoryError> {
        let meeting = sqlx::query_as::<_, Meeting>(&format!(
            "SELECT {MEETING_COLUMNS} FROM meetings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let agenda = sqlx::query_as::<_, AgendaItem>(
            "SELECT id, meeting_id, position, title, description
             FROM meeting_agenda
             WHERE meeting_id = $1
             ORDER BY position",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(MeetingDetail { meeting, agenda })
    }

    /// Create a meeting together with its agenda, atomically. Agenda items
    /// are numbered in payload order starting from 1.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails; nothing is
    /// written in that case.
    pub async fn create(
        &self,
        payload: &MeetingPayload,
        agenda: &[AgendaItemPayload],
    ) -> Result<MeetingDetail, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let meeting = sqlx::query_as::<_, Meeting>(&format!(
            "INSERT INTO meetings (meeting_type, progressive_number, meeting_date,
                                   location, convocator, description)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {MEETING_COLUMNS}"
        ))
        .bind(payload.meeting_type)
        .bind(payload.progressive_number)
        .bind(payload.meeting_date)
        .bind(&payload.location)
        .bind(&payload.convocator)
        .bind(&payload.description)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(agenda.len());
        for (index, item) in agenda.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let position = index as i32 + 1;
            let row = sqlx::query_as::<_, AgendaItem>(
                "INSERT INTO meeting_agenda (meeting_id, position, title, description)
                 VALUES ($1, $2, $3, $4)
                 RETURNING id, meeting_id, position, title, description",
            )
            .bind(meeting.id)
            .bind(position)
            .bind(&item.title)
            .bind(&item.description)
            .fetch_one(&mut *tx)
            .await?;
            items.push(row);
        }

        tx.commit().await?;
        Ok(MeetingDetail {
            meeting,
            agenda: items,
        })
    }

    /// Update a meeting and replace its agenda, atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the meeting does not exist.
    pub async fn update(
        &self,
        id: MeetingId,
        payload: &MeetingPayload,
        agenda: &[AgendaItemPayload],
    ) -> Result<MeetingDetail, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let meeting = sqlx::query_as::<_, Meeting>(&format!(
            "UPDATE meetings SET meeting_type = $2, progressive_number = $3,
                 meeting_date = $4, location = $5, convocator = $6, description = $7
             WHERE id = $1
             RETURNING {MEETING_COLUMNS}"
        ))
        .bind(id)
        .bind(payload.meeting_type)
        .bind(payload.progressive_number)
        .bind(payload.meeting_date)
        .bind(&payload.location)
        .bind(&payload.convocator)
        .bind(&payload.description)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        sqlx::query("DELETE FROM meeting_agenda WHERE meeting_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let mut items = Vec::with_capacity(agenda.len());
        for (index, item) in agenda.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let position = index as i32 + 1;
            let row = sqlx::query_as::<_, AgendaItem>(
                "INSERT INTO meeting_agenda (meeting_id, position, title, description)
                 VALUES ($1, $2, $3, $4)
                 RETURNING id, meeting_id, position, title, description",
            )
            .bind(id)
            .bind(position)
            .bind(&item.title)
            .bind(&item.description)
            .fetch_one(&mut *tx)
            .await?;
            items.push(row);
        }

        tx.commit().await?;
        Ok(MeetingDetail {
            meeting,
            agenda: items,
        })
    }

    /// Delete a meeting and its agenda, atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the meeting does not exist.
    pub async fn delete(&self, id: MeetingId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM meeting_agenda WHERE meeting_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM meetings WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &MeetingFilter) {
    if let Some(meeting_type) = filter.meeting_type {
        query.push(" AND meeting_type = ").push_bind(meeting_type);
    }
    if let Some(from) = filter.from {
        query.push(" AND meeting_date >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        query.push(" AND meeting_date <= ").push_bind(to);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        query
            .push(" AND (location ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR convocator ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
