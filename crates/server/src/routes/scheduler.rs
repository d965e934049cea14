//! Scheduler pages: deadlines, reminders and completion.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::Redirect,
    routing::{get, post},
};
use tower_sessions::Session;

use easyvol_core::{Action, Module, SchedulerItemId, SchedulerPriority, SchedulerStatus};

use crate::db::{Page, Pagination, SchedulerRepository, UserRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::AuthenticatedUser;
use crate::models::scheduler::{SchedulerFilter, SchedulerItem, SchedulerItemPayload};
use crate::models::user::{User, UserFilter};
use crate::routes::{PageContext, record_activity};
use crate::state::AppState;

/// Build the scheduler router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/scheduler", get(list))
        .route("/scheduler/new", get(new_form).post(create))
        .route("/scheduler/{id}/edit", get(edit_form).post(update))
        .route("/scheduler/{id}/complete", post(complete))
        .route("/scheduler/{id}/delete", post(delete))
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "scheduler/list.html")]
struct SchedulerListTemplate {
    ctx: PageContext,
    page: Page<SchedulerItem>,
    filter: SchedulerFilter,
    statuses: &'static [SchedulerStatus],
    priorities: &'static [SchedulerPriority],
}

#[derive(Template, WebTemplate)]
#[template(path = "scheduler/form.html")]
struct SchedulerFormTemplate {
    ctx: PageContext,
    item: Option<SchedulerItem>,
    priorities: &'static [SchedulerPriority],
    statuses: &'static [SchedulerStatus],
    users: Vec<User>,
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Filtered, paginated deadline list. Items past their due date are swept
/// to `scaduto` before the query runs.
///
/// GET /scheduler
async fn list(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Query(filter): Query<SchedulerFilter>,
    Query(pagination): Query<Pagination>,
) -> Result<SchedulerListTemplate, AppError> {
    auth.require(Module::Scheduler, Action::View)?;

    let repo = SchedulerRepository::new(state.pool());
    let swept = repo.mark_overdue().await?;
    if swept > 0 {
        tracing::debug!(swept, "Marked overdue scheduler items");
    }
    let page = repo.list(&filter, pagination).await?;

    Ok(SchedulerListTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/scheduler").await?,
        page,
        filter,
        statuses: SchedulerStatus::all(),
        priorities: SchedulerPriority::all(),
    })
}

/// Active users, for the "assigned to" select.
async fn assignable_users(state: &AppState) -> Result<Vec<User>, AppError> {
    let filter = UserFilter {
        active: Some(true),
        ..UserFilter::default()
    };
    let page = UserRepository::new(state.pool())
        .list(&filter, Pagination::new(1, 100))
        .await?;
    Ok(page.items)
}

/// Blank create form.
///
/// GET /scheduler/new
async fn new_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
) -> Result<SchedulerFormTemplate, AppError> {
    auth.require(Module::Scheduler, Action::Create)?;

    Ok(SchedulerFormTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/scheduler").await?,
        item: None,
        priorities: SchedulerPriority::all(),
        statuses: SchedulerStatus::all(),
        users: assignable_users(&state).await?,
    })
}

/// Create a deadline.
///
/// POST /scheduler/new
async fn create(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Form(payload): Form<SchedulerItemPayload>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Scheduler, Action::Create)?;

    let item = SchedulerRepository::new(state.pool())
        .create(&payload)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Scheduler,
        Action::Create,
        Some(item.id.as_i32()),
        format!("Creata scadenza \"{}\"", item.title),
    )
    .await;

    Ok(Redirect::to("/scheduler"))
}

/// Pre-filled edit form.
///
/// GET /scheduler/{id}/edit
async fn edit_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Path(id): Path<SchedulerItemId>,
) -> Result<SchedulerFormTemplate, AppError> {
    auth.require(Module::Scheduler, Action::Edit)?;

    let item = SchedulerRepository::new(state.pool()).get(id).await?;

    Ok(SchedulerFormTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/scheduler").await?,
        item: Some(item),
        priorities: SchedulerPriority::all(),
        statuses: SchedulerStatus::all(),
        users: assignable_users(&state).await?,
    })
}

/// Update a deadline.
///
/// POST /scheduler/{id}/edit
async fn update(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<SchedulerItemId>,
    Form(payload): Form<SchedulerItemPayload>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Scheduler, Action::Edit)?;

    let item = SchedulerRepository::new(state.pool())
        .update(id, &payload)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Scheduler,
        Action::Edit,
        Some(item.id.as_i32()),
        format!("Aggiornata scadenza \"{}\"", item.title),
    )
    .await;

    Ok(Redirect::to("/scheduler"))
}

/// Mark a deadline completed, stamping the completion time.
///
/// POST /scheduler/{id}/complete
async fn complete(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<SchedulerItemId>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Scheduler, Action::Edit)?;

    SchedulerRepository::new(state.pool()).complete(id).await?;

    record_activity(
        &state,
        &auth,
        Module::Scheduler,
        Action::Edit,
        Some(id.as_i32()),
        format!("Completata scadenza id {}", id.as_i32()),
    )
    .await;

    Ok(Redirect::to("/scheduler"))
}

/// Delete a deadline.
///
/// POST /scheduler/{id}/delete
async fn delete(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<SchedulerItemId>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Scheduler, Action::Delete)?;

    SchedulerRepository::new(state.pool()).delete(id).await?;

    record_activity(
        &state,
        &auth,
        Module::Scheduler,
        Action::Delete,
        Some(id.as_i32()),
        format!("Eliminata scadenza id {}", id.as_i32()),
    )
    .await;

    Ok(Redirect::to("/scheduler"))
}
