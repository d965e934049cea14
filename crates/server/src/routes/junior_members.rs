//! Junior member (under-18) registry pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::Redirect,
    routing::{get, post},
};
use tower_sessions::Session;

use easyvol_core::{Action, JuniorMemberId, MemberStatus, Module};

use crate::db::{JuniorMemberRepository, Page, Pagination};
use crate::error::AppError;
use crate::filters;
use crate::middleware::AuthenticatedUser;
use crate::models::junior_member::{JuniorMember, JuniorMemberFilter, JuniorMemberPayload};
use crate::routes::{PageContext, record_activity};
use crate::state::AppState;

/// Build the junior member registry router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/junior-members", get(list))
        .route("/junior-members/new", get(new_form).post(create))
        .route("/junior-members/{id}/edit", get(edit_form).post(update))
        .route("/junior-members/{id}/delete", post(delete))
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "junior_members/list.html")]
struct JuniorListTemplate {
    ctx: PageContext,
    page: Page<JuniorMember>,
    filter: JuniorMemberFilter,
    statuses: &'static [MemberStatus],
}

#[derive(Template, WebTemplate)]
#[template(path = "junior_members/form.html")]
struct JuniorFormTemplate {
    ctx: PageContext,
    member: Option<JuniorMember>,
    statuses: &'static [MemberStatus],
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Filtered, paginated junior member list.
///
/// GET /junior-members
async fn list(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Query(filter): Query<JuniorMemberFilter>,
    Query(pagination): Query<Pagination>,
) -> Result<JuniorListTemplate, AppError> {
    auth.require(Module::JuniorMembers, Action::View)?;

    let page = JuniorMemberRepository::new(state.pool())
        .list(&filter, pagination)
        .await?;

    Ok(JuniorListTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/junior-members").await?,
        page,
        filter,
        statuses: MemberStatus::all(),
    })
}

/// Blank create form.
///
/// GET /junior-members/new
async fn new_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
) -> Result<JuniorFormTemplate, AppError> {
    auth.require(Module::JuniorMembers, Action::Create)?;

    Ok(JuniorFormTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/junior-members").await?,
        member: None,
        statuses: MemberStatus::all(),
    })
}

/// Create a junior member with guardian details.
///
/// POST /junior-members/new
async fn create(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Form(payload): Form<JuniorMemberPayload>,
) -> Result<Redirect, AppError> {
    auth.require(Module::JuniorMembers, Action::Create)?;

    let member = JuniorMemberRepository::new(state.pool())
        .create(&payload, auth.user.id)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::JuniorMembers,
        Action::Create,
        Some(member.id.as_i32()),
        format!(
            "Creato socio giovane {} (matricola {})",
            member.display_name(),
            member.registration_number
        ),
    )
    .await;

    Ok(Redirect::to("/junior-members"))
}

/// Pre-filled edit form.
///
/// GET /junior-members/{id}/edit
async fn edit_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Path(id): Path<JuniorMemberId>,
) -> Result<JuniorFormTemplate, AppError> {
    auth.require(Module::JuniorMembers, Action::Edit)?;

    let member = JuniorMemberRepository::new(state.pool()).get(id).await?;

    Ok(JuniorFormTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/junior-members").await?,
        member: Some(member),
        statuses: MemberStatus::all(),
    })
}

/// Update a junior member.
///
/// POST /junior-members/{id}/edit
async fn update(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<JuniorMemberId>,
    Form(payload): Form<JuniorMemberPayload>,
) -> Result<Redirect, AppError> {
    auth.require(Module::JuniorMembers, Action::Edit)?;

    let member = JuniorMemberRepository::new(state.pool())
        .update(id, &payload, auth.user.id)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::JuniorMembers,
        Action::Edit,
        Some(member.id.as_i32()),
        format!("Aggiornato socio giovane {}", member.display_name()),
    )
    .await;

    Ok(Redirect::to("/junior-members"))
}

/// Soft-delete: the junior member is marked resigned, the row stays.
///
/// POST /junior-members/{id}/delete
async fn delete(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<JuniorMemberId>,
) -> Result<Redirect, AppError> {
    auth.require(Module::JuniorMembers, Action::Delete)?;

    JuniorMemberRepository::new(state.pool())
        .delete(id, auth.user.id)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::JuniorMembers,
        Action::Delete,
        Some(id.as_i32()),
        format!("Dimesso socio giovane id {}", id.as_i32()),
    )
    .await;

    Ok(Redirect::to("/junior-members"))
}
