//! Event and intervention pages.
//!
//! Opening and closing an event pushes a Telegram notification to the
//! association channel, when the bot is configured.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::Redirect,
    routing::{get, post},
};
use tower_sessions::Session;

use easyvol_core::{Action, EventId, EventStatus, Module};

use crate::db::{EventRepository, Page, Pagination};
use crate::error::AppError;
use crate::filters;
use crate::middleware::AuthenticatedUser;
use crate::models::event::{Event, EventFilter, EventPayload};
use crate::routes::{PageContext, record_activity};
use crate::state::AppState;

/// Build the events router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list))
        .route("/events/new", get(new_form).post(create))
        .route("/events/{id}/edit", get(edit_form).post(update))
        .route("/events/{id}/delete", post(delete))
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "events/list.html")]
struct EventListTemplate {
    ctx: PageContext,
    page: Page<Event>,
    filter: EventFilter,
    statuses: &'static [EventStatus],
}

#[derive(Template, WebTemplate)]
#[template(path = "events/form.html")]
struct EventFormTemplate {
    ctx: PageContext,
    event: Option<Event>,
    statuses: &'static [EventStatus],
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Filtered, paginated event list.
///
/// GET /events
async fn list(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Query(filter): Query<EventFilter>,
    Query(pagination): Query<Pagination>,
) -> Result<EventListTemplate, AppError> {
    auth.require(Module::Events, Action::View)?;

    let page = EventRepository::new(state.pool())
        .list(&filter, pagination)
        .await?;

    Ok(EventListTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/events").await?,
        page,
        filter,
        statuses: EventStatus::all(),
    })
}

/// Blank create form.
///
/// GET /events/new
async fn new_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
) -> Result<EventFormTemplate, AppError> {
    auth.require(Module::Events, Action::Create)?;

    Ok(EventFormTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/events").await?,
        event: None,
        statuses: EventStatus::all(),
    })
}

/// Create an event. An event opened here shows up on the operations map
/// when it carries coordinates.
///
/// POST /events/new
async fn create(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Form(payload): Form<EventPayload>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Events, Action::Create)?;

    let event = EventRepository::new(state.pool())
        .create(&payload, auth.user.id)
        .await?;

    if event.status == EventStatus::Aperto {
        if let Some(telegram) = state.telegram() {
            telegram
                .notify_event_opened(&event.title, event.location.as_deref())
                .await;
        }
    }

    record_activity(
        &state,
        &auth,
        Module::Events,
        Action::Create,
        Some(event.id.as_i32()),
        format!("Creato evento \"{}\"", event.title),
    )
    .await;

    Ok(Redirect::to("/events"))
}

/// Pre-filled edit form.
///
/// GET /events/{id}/edit
async fn edit_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Path(id): Path<EventId>,
) -> Result<EventFormTemplate, AppError> {
    auth.require(Module::Events, Action::Edit)?;

    let event = EventRepository::new(state.pool()).get(id).await?;

    Ok(EventFormTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/events").await?,
        event: Some(event),
        statuses: EventStatus::all(),
    })
}

/// Update an event, notifying the channel on open/close transitions.
///
/// POST /events/{id}/edit
async fn update(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<EventId>,
    Form(payload): Form<EventPayload>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Events, Action::Edit)?;

    let repo = EventRepository::new(state.pool());
    let previous = repo.get(id).await?;
    let event = repo.update(id, &payload).await?;

    if previous.status != event.status {
        if let Some(telegram) = state.telegram() {
            match event.status {
                EventStatus::Aperto => {
                    telegram
                        .notify_event_opened(&event.title, event.location.as_deref())
                        .await;
                }
                EventStatus::Chiuso => telegram.notify_event_closed(&event.title).await,
            }
        }
    }

    record_activity(
        &state,
        &auth,
        Module::Events,
        Action::Edit,
        Some(event.id.as_i32()),
        format!("Aggiornato evento \"{}\"", event.title),
    )
    .await;

    Ok(Redirect::to("/events"))
}

/// Delete an event.
///
/// POST /events/{id}/delete
async fn delete(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<EventId>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Events, Action::Delete)?;

    EventRepository::new(state.pool()).delete(id).await?;

    record_activity(
        &state,
        &auth,
        Module::Events,
        Action::Delete,
        Some(id.as_i32()),
        format!("Eliminato evento id {}", id.as_i32()),
    )
    .await;

    Ok(Redirect::to("/events"))
}
