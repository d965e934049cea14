//! Vehicle fleet pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::Redirect,
    routing::{get, post},
};
use tower_sessions::Session;

use easyvol_core::{Action, Module, VehicleId, VehicleStatus, VehicleType};

use crate::db::{Page, Pagination, VehicleRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::AuthenticatedUser;
use crate::models::vehicle::{Vehicle, VehicleFilter, VehiclePayload};
use crate::routes::{PageContext, record_activity};
use crate::state::AppState;

/// Build the fleet router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vehicles", get(list))
        .route("/vehicles/new", get(new_form).post(create))
        .route("/vehicles/{id}/edit", get(edit_form).post(update))
        .route("/vehicles/{id}/delete", post(delete))
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "vehicles/list.html")]
struct VehicleListTemplate {
    ctx: PageContext,
    page: Page<Vehicle>,
    filter: VehicleFilter,
    statuses: &'static [VehicleStatus],
    vehicle_types: &'static [VehicleType],
}

#[derive(Template, WebTemplate)]
#[template(path = "vehicles/form.html")]
struct VehicleFormTemplate {
    ctx: PageContext,
    vehicle: Option<Vehicle>,
    statuses: &'static [VehicleStatus],
    vehicle_types: &'static [VehicleType],
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Filtered, paginated fleet list.
///
/// GET /vehicles
async fn list(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Query(filter): Query<VehicleFilter>,
    Query(pagination): Query<Pagination>,
) -> Result<VehicleListTemplate, AppError> {
    auth.require(Module::Vehicles, Action::View)?;

    let page = VehicleRepository::new(state.pool())
        .list(&filter, pagination)
        .await?;

    Ok(VehicleListTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/vehicles").await?,
        page,
        filter,
        statuses: VehicleStatus::all(),
        vehicle_types: VehicleType::all(),
    })
}

/// Blank create form.
///
/// GET /vehicles/new
async fn new_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
) -> Result<VehicleFormTemplate, AppError> {
    auth.require(Module::Vehicles, Action::Create)?;

    Ok(VehicleFormTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/vehicles").await?,
        vehicle: None,
        statuses: VehicleStatus::all(),
        vehicle_types: VehicleType::all(),
    })
}

/// Register a fleet asset.
///
/// POST /vehicles/new
async fn create(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Form(payload): Form<VehiclePayload>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Vehicles, Action::Create)?;

    let vehicle = VehicleRepository::new(state.pool()).create(&payload).await?;

    record_activity(
        &state,
        &auth,
        Module::Vehicles,
        Action::Create,
        Some(vehicle.id.as_i32()),
        format!("Registrato mezzo \"{}\"", vehicle.name),
    )
    .await;

    Ok(Redirect::to("/vehicles"))
}

/// Pre-filled edit form.
///
/// GET /vehicles/{id}/edit
async fn edit_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Path(id): Path<VehicleId>,
) -> Result<VehicleFormTemplate, AppError> {
    auth.require(Module::Vehicles, Action::Edit)?;

    let vehicle = VehicleRepository::new(state.pool()).get(id).await?;

    Ok(VehicleFormTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/vehicles").await?,
        vehicle: Some(vehicle),
        statuses: VehicleStatus::all(),
        vehicle_types: VehicleType::all(),
    })
}

/// Update a fleet asset.
///
/// POST /vehicles/{id}/edit
async fn update(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<VehicleId>,
    Form(payload): Form<VehiclePayload>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Vehicles, Action::Edit)?;

    let vehicle = VehicleRepository::new(state.pool())
        .update(id, &payload)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Vehicles,
        Action::Edit,
        Some(vehicle.id.as_i32()),
        format!("Aggiornato mezzo \"{}\"", vehicle.name),
    )
    .await;

    Ok(Redirect::to("/vehicles"))
}

/// Delete a fleet asset.
///
/// POST /vehicles/{id}/delete
async fn delete(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<VehicleId>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Vehicles, Action::Delete)?;

    VehicleRepository::new(state.pool()).delete(id).await?;

    record_activity(
        &state,
        &auth,
        Module::Vehicles,
        Action::Delete,
        Some(id.as_i32()),
        format!("Eliminato mezzo id {}", id.as_i32()),
    )
    .await;

    Ok(Redirect::to("/vehicles"))
}
