//! Repository for events and interventions.

use sqlx::{PgPool, Postgres, QueryBuilder};

use easyvol_core::{EventId, EventStatus, UserId};

use super::pagination::{Page, Pagination};
use super::RepositoryError;
use crate::models::event::{Event, EventFilter, EventPayload, MapEvent};

const EVENT_COLUMNS: &str = "id, event_type, title, description, start_date, end_date, \
     location, latitude, longitude, status, created_at, created_by, updated_at";

/// Repository for event database operations.
pub struct EventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepository<'a> {
    /// Create a new event repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List events matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &EventFilter,
        pagination: Pagination,
    ) -> Result<Page<Event>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE 1=1"
        ));
        push_filter(&mut query, filter);
        query.push(" ORDER BY start_date DESC");
        query.push(" LIMIT ").push_bind(pagination.limit());
        query.push(" OFFSET ").push_bind(pagination.offset());

        let items = query.build_query_as::<Event>().fetch_all(self.pool).await?;

        let mut count_query =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM events WHERE 1=1");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        Ok(Page::new(items, total, pagination))
    }

    /// Fetch one event by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such event exists.
    pub async fn get(&self, id: EventId) -> Result<Event, RepositoryError> {
        sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Create an event.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        payload: &EventPayload,
        created_by: UserId,
    ) -> Result<Event, RepositoryError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "INSERT INTO events (event_type, title, description, start_date, end_date,
                                 location, latitude, longitude, status, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(&payload.event_type)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.start_date)
        .bind(payload.end_date)
        .bind(&payload.location)
        .bind(payload.latitude)
        .bind(payload.longitude)
        .bind(payload.status)
        .bind(created_by)
        .fetch_one(self.pool)
        .await?;

        Ok(event)
    }

    /// Update an event in place.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the event does not exist.
    pub async fn update(
        &self,
        id: EventId,
        payload: &EventPayload,
    ) -> Result<Event, RepositoryError> {
        sqlx::query_as::<_, Event>(&format!(
            "UPDATE events SET event_type = $2, title = $3, description = $4,
                 start_date = $5, end_date = $6, location = $7,
                 latitude = $8, longitude = $9, status = $10, updated_at = NOW()
             WHERE id = $1
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .bind(&payload.event_type)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.start_date)
        .bind(payload.end_date)
        .bind(&payload.location)
        .bind(payload.latitude)
        .bind(payload.longitude)
        .bind(payload.status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete an event.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the event does not exist.
    pub async fn delete(&self, id: EventId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Open events with coordinates, for the operations-center map.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn open_events_with_coordinates(&self) -> Result<Vec<MapEvent>, RepositoryError> {
        let events = sqlx::query_as::<_, MapEvent>(
            "SELECT id, title, event_type, location, latitude, longitude, start_date
             FROM events
             WHERE status = $1 AND latitude IS NOT NULL AND longitude IS NOT NULL
             ORDER BY start_date DESC",
        )
        .bind(EventStatus::Aperto)
        .fetch_all(self.pool)
        .await?;
        Ok(events)
    }

    /// Number of open events, for the operations snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_open(&self) -> Result<i64, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE status = $1")
            .bind(EventStatus::Aperto)
            .fetch_one(self.pool)
            .await?;
        Ok(total)
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &EventFilter) {
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status);
    }
    if let Some(event_type) = filter.event_type.as_deref().filter(|s| !s.is_empty()) {
        query
            .push(" AND event_type = ")
            .push_bind(event_type.to_string());
    }
    if let Some(from) = filter.from {
        query.push(" AND start_date::date >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        query.push(" AND start_date::date <= ").push_bind(to);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        query
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR location ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
