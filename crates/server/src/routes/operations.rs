//! Operations-center pages: live dashboard, radio directory with
//! assignments, and the on-call roster.
//!
//! The dashboard page itself is mostly static; the map markers, radio
//! assignments and roster refresh through the polling APIs under `/api/`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, State},
    response::Redirect,
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;

use easyvol_core::{Action, MemberId, MemberStatus, Module, OnCallShiftId, RadioId, RadioStatus};

use crate::db::{MemberRepository, OperationsRepository, Pagination};
use crate::error::AppError;
use crate::filters;
use crate::middleware::AuthenticatedUser;
use crate::models::member::{Member, MemberFilter};
use crate::models::operations::{
    ActiveAssignment, OnCallShiftPayload, Radio, RadioPayload, RosterShift,
};
use crate::routes::{PageContext, record_activity};
use crate::state::AppState;

/// Build the operations-center router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/operations", get(dashboard))
        .route("/operations/radios", get(radios))
        .route("/operations/radios/new", get(radio_new_form).post(create_radio))
        .route(
            "/operations/radios/{id}/edit",
            get(radio_edit_form).post(update_radio),
        )
        .route("/operations/radios/{id}/assign", post(assign_radio))
        .route("/operations/radios/{id}/return", post(return_radio))
        .route("/operations/on-call/new", post(add_shift))
        .route("/operations/on-call/{id}/delete", post(delete_shift))
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "operations/index.html")]
struct OperationsDashboardTemplate {
    ctx: PageContext,
    roster: Vec<RosterShift>,
    members: Vec<Member>,
}

#[derive(Template, WebTemplate)]
#[template(path = "operations/radios.html")]
struct RadioListTemplate {
    ctx: PageContext,
    radios: Vec<Radio>,
    assignments: Vec<ActiveAssignment>,
    members: Vec<Member>,
}

#[derive(Template, WebTemplate)]
#[template(path = "operations/radio_form.html")]
struct RadioFormTemplate {
    ctx: PageContext,
    radio: Option<Radio>,
    statuses: &'static [RadioStatus],
}

// =============================================================================
// Request Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AssignForm {
    member_id: MemberId,
    #[serde(default)]
    notes: Option<String>,
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Active members, for the assignment and roster selects.
async fn operational_members(state: &AppState) -> Result<Vec<Member>, AppError> {
    let filter = MemberFilter {
        status: Some(MemberStatus::Attivo),
        ..MemberFilter::default()
    };
    let page = MemberRepository::new(state.pool())
        .list(&filter, Pagination::new(1, 100))
        .await?;
    Ok(page.items)
}

/// Live operations dashboard: map, counters and the current roster.
///
/// GET /operations
async fn dashboard(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
) -> Result<OperationsDashboardTemplate, AppError> {
    auth.require(Module::Operations, Action::View)?;

    let roster = OperationsRepository::new(state.pool())
        .current_roster()
        .await?;

    Ok(OperationsDashboardTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/operations").await?,
        roster,
        members: operational_members(&state).await?,
    })
}

/// Radio directory with open assignments.
///
/// GET /operations/radios
async fn radios(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
) -> Result<RadioListTemplate, AppError> {
    auth.require(Module::Operations, Action::View)?;

    let repo = OperationsRepository::new(state.pool());
    let radios = repo.list_radios(None).await?;
    let assignments = repo.active_assignments().await?;

    Ok(RadioListTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/operations/radios").await?,
        radios,
        assignments,
        members: operational_members(&state).await?,
    })
}

/// Blank radio form.
///
/// GET /operations/radios/new
async fn radio_new_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
) -> Result<RadioFormTemplate, AppError> {
    auth.require(Module::Operations, Action::Create)?;

    Ok(RadioFormTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/operations/radios").await?,
        radio: None,
        statuses: RadioStatus::all(),
    })
}

/// Register a radio. A duplicate serial number is rejected with
/// "numero di serie già presente".
///
/// POST /operations/radios/new
async fn create_radio(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Form(payload): Form<RadioPayload>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Operations, Action::Create)?;

    let radio = OperationsRepository::new(state.pool())
        .create_radio(&payload)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Operations,
        Action::Create,
        Some(radio.id.as_i32()),
        format!("Registrata radio \"{}\"", radio.name),
    )
    .await;

    Ok(Redirect::to("/operations/radios"))
}

/// Pre-filled radio form.
///
/// GET /operations/radios/{id}/edit
async fn radio_edit_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Path(id): Path<RadioId>,
) -> Result<RadioFormTemplate, AppError> {
    auth.require(Module::Operations, Action::Edit)?;

    let radio = OperationsRepository::new(state.pool()).get_radio(id).await?;

    Ok(RadioFormTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/operations/radios").await?,
        radio: Some(radio),
        statuses: RadioStatus::all(),
    })
}

/// Update a radio.
///
/// POST /operations/radios/{id}/edit
async fn update_radio(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<RadioId>,
    Form(payload): Form<RadioPayload>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Operations, Action::Edit)?;

    let radio = OperationsRepository::new(state.pool())
        .update_radio(id, &payload)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Operations,
        Action::Edit,
        Some(radio.id.as_i32()),
        format!("Aggiornata radio \"{}\"", radio.name),
    )
    .await;

    Ok(Redirect::to("/operations/radios"))
}

/// Hand a radio to a volunteer. Only available radios can be assigned;
/// anything else is rejected with "radio non disponibile".
///
/// POST /operations/radios/{id}/assign
async fn assign_radio(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<RadioId>,
    Form(form): Form<AssignForm>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Operations, Action::Edit)?;

    OperationsRepository::new(state.pool())
        .assign_radio(id, form.member_id, auth.user.id, form.notes.as_deref())
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Operations,
        Action::Edit,
        Some(id.as_i32()),
        format!(
            "Assegnata radio id {} al socio id {}",
            id.as_i32(),
            form.member_id.as_i32()
        ),
    )
    .await;

    Ok(Redirect::to("/operations/radios"))
}

/// Take a radio back, closing the open assignment.
///
/// POST /operations/radios/{id}/return
async fn return_radio(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<RadioId>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Operations, Action::Edit)?;

    OperationsRepository::new(state.pool()).return_radio(id).await?;

    record_activity(
        &state,
        &auth,
        Module::Operations,
        Action::Edit,
        Some(id.as_i32()),
        format!("Rientrata radio id {}", id.as_i32()),
    )
    .await;

    Ok(Redirect::to("/operations/radios"))
}

/// Add an on-call shift. Overlapping shifts for the same volunteer are
/// rejected with "turno sovrapposto a uno esistente".
///
/// POST /operations/on-call/new
async fn add_shift(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Form(payload): Form<OnCallShiftPayload>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Operations, Action::Create)?;

    let shift = OperationsRepository::new(state.pool())
        .add_shift(&payload, auth.user.id)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Operations,
        Action::Create,
        Some(shift.id.as_i32()),
        format!("Aggiunto turno di reperibilità id {}", shift.id.as_i32()),
    )
    .await;

    Ok(Redirect::to("/operations"))
}

/// Remove an on-call shift.
///
/// POST /operations/on-call/{id}/delete
async fn delete_shift(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<OnCallShiftId>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Operations, Action::Delete)?;

    OperationsRepository::new(state.pool()).delete_shift(id).await?;

    record_activity(
        &state,
        &auth,
        Module::Operations,
        Action::Delete,
        Some(id.as_i32()),
        format!("Rimosso turno di reperibilità id {}", id.as_i32()),
    )
    .await;

    Ok(Redirect::to("/operations"))
}
