//! Events and interventions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use easyvol_core::{EventId, EventStatus, UserId};

/// An event or intervention (emergency, exercise, service).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Event {
    pub id: EventId,
    /// Free-form category ("emergenza", "esercitazione", "servizio"...).
    pub event_type: String,
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    /// Coordinates for the operations-center map, when geocoded.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Form payload for creating or updating an event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventPayload {
    pub event_type: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "super::forms::option_from_str")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "super::forms::option_from_str")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "super::forms::option_from_str")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub status: EventStatus,
}

/// Whitelisted query-string filters for the event list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    #[serde(default, deserialize_with = "super::forms::option_variant")]
    pub status: Option<EventStatus>,
    #[serde(default)]
    pub event_type: Option<String>,
    /// Events starting on or after this date.
    #[serde(default, deserialize_with = "super::forms::option_from_str")]
    pub from: Option<NaiveDate>,
    /// Events starting on or before this date.
    #[serde(default, deserialize_with = "super::forms::option_from_str")]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub search: Option<String>,
}

/// Compact open-event record the map polling API returns.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MapEvent {
    pub id: EventId,
    pub title: String,
    pub event_type: String,
    pub location: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: DateTime<Utc>,
}
