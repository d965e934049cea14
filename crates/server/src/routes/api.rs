//! Polling JSON APIs behind the operations-center dashboard.
//!
//! These endpoints are called from the dashboard's JavaScript on a timer;
//! unauthenticated callers get a plain 401 instead of a login redirect.

use axum::{Json, Router, extract::State, routing::get};

use easyvol_core::{Action, Module};

use crate::db::{EventRepository, OperationsRepository};
use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::models::event::MapEvent;
use crate::models::operations::OperationsStatus;
use crate::services::earthquakes::Earthquake;
use crate::state::AppState;

/// Build the JSON API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/events/map", get(events_map))
        .route("/api/operations/status", get(operations_status))
        .route("/api/earthquakes", get(earthquakes))
}

/// Open events with coordinates, for the map markers.
///
/// GET /api/events/map
async fn events_map(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<MapEvent>>, AppError> {
    auth.require(Module::Events, Action::View)?;

    let events = EventRepository::new(state.pool())
        .open_events_with_coordinates()
        .await?;
    Ok(Json(events))
}

/// Radio assignments, on-call roster and counters in one snapshot.
///
/// GET /api/operations/status
async fn operations_status(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<OperationsStatus>, AppError> {
    auth.require(Module::Operations, Action::View)?;

    let ops = OperationsRepository::new(state.pool());
    let assignments = ops.active_assignments().await?;
    let on_call = ops.current_roster().await?;
    let available_radios = ops.count_available_radios().await?;
    let open_events = EventRepository::new(state.pool()).count_open().await?;

    Ok(Json(OperationsStatus {
        assignments,
        on_call,
        available_radios,
        open_events,
    }))
}

/// Recent earthquakes from the INGV feed, for the map overlay.
///
/// GET /api/earthquakes
async fn earthquakes(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<Earthquake>>, AppError> {
    auth.require(Module::Operations, Action::View)?;

    let quakes = state
        .earthquakes()
        .recent()
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;
    Ok(Json(quakes))
}
