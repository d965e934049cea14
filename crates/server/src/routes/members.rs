//! Adult member registry pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::Redirect,
    routing::{get, post},
};
use tower_sessions::Session;

use easyvol_core::{Action, MemberId, MemberStatus, MemberType, Module, VolunteerStatus};

use crate::db::{MemberRepository, Page, Pagination};
use crate::error::AppError;
use crate::filters;
use crate::middleware::AuthenticatedUser;
use crate::models::member::{Member, MemberFilter, MemberPayload};
use crate::routes::{PageContext, record_activity};
use crate::state::AppState;

/// Build the member registry router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/members", get(list))
        .route("/members/new", get(new_form).post(create))
        .route("/members/{id}/edit", get(edit_form).post(update))
        .route("/members/{id}/delete", post(delete))
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "members/list.html")]
struct MemberListTemplate {
    ctx: PageContext,
    page: Page<Member>,
    filter: MemberFilter,
    statuses: &'static [MemberStatus],
    volunteer_statuses: &'static [VolunteerStatus],
}

#[derive(Template, WebTemplate)]
#[template(path = "members/form.html")]
struct MemberFormTemplate {
    ctx: PageContext,
    member: Option<Member>,
    statuses: &'static [MemberStatus],
    member_types: &'static [MemberType],
    volunteer_statuses: &'static [VolunteerStatus],
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Filtered, paginated member list.
///
/// GET /members
async fn list(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Query(filter): Query<MemberFilter>,
    Query(pagination): Query<Pagination>,
) -> Result<MemberListTemplate, AppError> {
    auth.require(Module::Members, Action::View)?;

    let page = MemberRepository::new(state.pool())
        .list(&filter, pagination)
        .await?;

    Ok(MemberListTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/members").await?,
        page,
        filter,
        statuses: MemberStatus::all(),
        volunteer_statuses: VolunteerStatus::all(),
    })
}

/// Blank create form.
///
/// GET /members/new
async fn new_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
) -> Result<MemberFormTemplate, AppError> {
    auth.require(Module::Members, Action::Create)?;

    Ok(MemberFormTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/members").await?,
        member: None,
        statuses: MemberStatus::all(),
        member_types: MemberType::all(),
        volunteer_statuses: VolunteerStatus::all(),
    })
}

/// Create a member; an empty matricola is auto-generated.
///
/// POST /members/new
async fn create(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Form(payload): Form<MemberPayload>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Members, Action::Create)?;

    let member = MemberRepository::new(state.pool())
        .create(&payload, auth.user.id)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Members,
        Action::Create,
        Some(member.id.as_i32()),
        format!(
            "Creato socio {} (matricola {})",
            member.display_name(),
            member.registration_number
        ),
    )
    .await;

    Ok(Redirect::to("/members"))
}

/// Pre-filled edit form.
///
/// GET /members/{id}/edit
async fn edit_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Path(id): Path<MemberId>,
) -> Result<MemberFormTemplate, AppError> {
    auth.require(Module::Members, Action::Edit)?;

    let member = MemberRepository::new(state.pool()).get(id).await?;

    Ok(MemberFormTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/members").await?,
        member: Some(member),
        statuses: MemberStatus::all(),
        member_types: MemberType::all(),
        volunteer_statuses: VolunteerStatus::all(),
    })
}

/// Update a member.
///
/// POST /members/{id}/edit
async fn update(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<MemberId>,
    Form(payload): Form<MemberPayload>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Members, Action::Edit)?;

    let member = MemberRepository::new(state.pool())
        .update(id, &payload, auth.user.id)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Members,
        Action::Edit,
        Some(member.id.as_i32()),
        format!("Aggiornato socio {}", member.display_name()),
    )
    .await;

    Ok(Redirect::to("/members"))
}

/// Soft-delete: the member is marked resigned, the row stays.
///
/// POST /members/{id}/delete
async fn delete(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<MemberId>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Members, Action::Delete)?;

    MemberRepository::new(state.pool())
        .delete(id, auth.user.id)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Members,
        Action::Delete,
        Some(id.as_i32()),
        format!("Dimesso socio id {}", id.as_i32()),
    )
    .await;

    Ok(Redirect::to("/members"))
}
