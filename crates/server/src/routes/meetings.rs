//! Meeting and assembly pages.
//!
//! The create/edit forms post the meeting fields together with repeated
//! `agenda_title` / `agenda_description` pairs, one per agenda row. Axum's
//! `Form` cannot collect repeated keys into a `Vec`, so the handlers take
//! the raw body and split it themselves.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, Query, RawForm, State},
    response::Redirect,
    routing::{get, post},
};
use tower_sessions::Session;

use easyvol_core::{Action, MeetingId, MeetingType, Module};

use crate::db::{MeetingRepository, Page, Pagination};
use crate::error::AppError;
use crate::filters;
use crate::middleware::AuthenticatedUser;
use crate::models::meeting::{AgendaItemPayload, Meeting, MeetingDetail, MeetingFilter, MeetingPayload};
use crate::routes::{PageContext, record_activity};
use crate::state::AppState;

/// Build the meetings router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/meetings", get(list))
        .route("/meetings/new", get(new_form).post(create))
        .route("/meetings/{id}", get(show))
        .route("/meetings/{id}/edit", get(edit_form).post(update))
        .route("/meetings/{id}/delete", post(delete))
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "meetings/list.html")]
struct MeetingListTemplate {
    ctx: PageContext,
    page: Page<Meeting>,
    filter: MeetingFilter,
    meeting_types: &'static [MeetingType],
}

#[derive(Template, WebTemplate)]
#[template(path = "meetings/show.html")]
struct MeetingShowTemplate {
    ctx: PageContext,
    detail: MeetingDetail,
}

#[derive(Template, WebTemplate)]
#[template(path = "meetings/form.html")]
struct MeetingFormTemplate {
    ctx: PageContext,
    detail: Option<MeetingDetail>,
    meeting_types: &'static [MeetingType],
}

// =============================================================================
// Form parsing
// =============================================================================

/// Split the raw urlencoded body into the meeting payload and its agenda
/// rows. Rows with an empty title are dropped.
fn parse_meeting_form(bytes: &[u8]) -> Result<(MeetingPayload, Vec<AgendaItemPayload>), AppError> {
    let payload: MeetingPayload = serde_urlencoded::from_bytes(bytes)
        .map_err(|e| AppError::BadRequest(format!("invalid meeting form: {e}")))?;

    let mut agenda: Vec<AgendaItemPayload> = Vec::new();
    for (key, value) in url::form_urlencoded::parse(bytes) {
        match key.as_ref() {
            "agenda_title" => agenda.push(AgendaItemPayload {
                title: value.into_owned(),
                description: None,
            }),
            "agenda_description" => {
                // Browsers submit fields in document order: the description
                // follows the title of the same row.
                if let Some(last) = agenda.last_mut() {
                    let value = value.trim();
                    if !value.is_empty() {
                        last.description = Some(value.to_string());
                    }
                }
            }
            _ => {}
        }
    }
    agenda.retain(|item| !item.title.trim().is_empty());

    Ok((payload, agenda))
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Filtered, paginated meeting list.
///
/// GET /meetings
async fn list(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Query(filter): Query<MeetingFilter>,
    Query(pagination): Query<Pagination>,
) -> Result<MeetingListTemplate, AppError> {
    auth.require(Module::Meetings, Action::View)?;

    let page = MeetingRepository::new(state.pool())
        .list(&filter, pagination)
        .await?;

    Ok(MeetingListTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/meetings").await?,
        page,
        filter,
        meeting_types: MeetingType::all(),
    })
}

/// Meeting detail with its ordered agenda.
///
/// GET /meetings/{id}
async fn show(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Path(id): Path<MeetingId>,
) -> Result<MeetingShowTemplate, AppError> {
    auth.require(Module::Meetings, Action::View)?;

    let detail = MeetingRepository::new(state.pool()).get(id).await?;

    Ok(MeetingShowTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/meetings").await?,
        detail,
    })
}

/// Blank create form.
///
/// GET /meetings/new
async fn new_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
) -> Result<MeetingFormTemplate, AppError> {
    auth.require(Module::Meetings, Action::Create)?;

    Ok(MeetingFormTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/meetings").await?,
        detail: None,
        meeting_types: MeetingType::all(),
    })
}

/// Create a meeting with its agenda in one transaction.
///
/// POST /meetings/new
async fn create(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    RawForm(bytes): RawForm,
) -> Result<Redirect, AppError> {
    auth.require(Module::Meetings, Action::Create)?;

    let (payload, agenda) = parse_meeting_form(&bytes)?;
    let detail = MeetingRepository::new(state.pool())
        .create(&payload, &agenda)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Meetings,
        Action::Create,
        Some(detail.meeting.id.as_i32()),
        format!(
            "Convocata {} del {}",
            detail.meeting.meeting_type.label(),
            detail.meeting.meeting_date.format("%d/%m/%Y")
        ),
    )
    .await;

    Ok(Redirect::to("/meetings"))
}

/// Pre-filled edit form.
///
/// GET /meetings/{id}/edit
async fn edit_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Path(id): Path<MeetingId>,
) -> Result<MeetingFormTemplate, AppError> {
    auth.require(Module::Meetings, Action::Edit)?;

    let detail = MeetingRepository::new(state.pool()).get(id).await?;

    Ok(MeetingFormTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/meetings").await?,
        detail: Some(detail),
        meeting_types: MeetingType::all(),
    })
}

/// Update a meeting, replacing the whole agenda.
///
/// POST /meetings/{id}/edit
async fn update(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<MeetingId>,
    RawForm(bytes): RawForm,
) -> Result<Redirect, AppError> {
    auth.require(Module::Meetings, Action::Edit)?;

    let (payload, agenda) = parse_meeting_form(&bytes)?;
    let detail = MeetingRepository::new(state.pool())
        .update(id, &payload, &agenda)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Meetings,
        Action::Edit,
        Some(detail.meeting.id.as_i32()),
        format!(
            "Aggiornata {} del {}",
            detail.meeting.meeting_type.label(),
            detail.meeting.meeting_date.format("%d/%m/%Y")
        ),
    )
    .await;

    Ok(Redirect::to("/meetings"))
}

/// Delete a meeting and its agenda.
///
/// POST /meetings/{id}/delete
async fn delete(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<MeetingId>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Meetings, Action::Delete)?;

    MeetingRepository::new(state.pool()).delete(id).await?;

    record_activity(
        &state,
        &auth,
        Module::Meetings,
        Action::Delete,
        Some(id.as_i32()),
        format!("Eliminata riunione id {}", id.as_i32()),
    )
    .await;

    Ok(Redirect::to("/meetings"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agenda_rows_pair_titles_with_descriptions() {
        let body = b"meeting_type=consiglio_direttivo&meeting_date=2026-02-10\
                     &agenda_title=Approvazione+bilancio&agenda_description=Bilancio+2025\
                     &agenda_title=Varie+ed+eventuali&agenda_description=";
        let (payload, agenda) = parse_meeting_form(body).expect("parse");
        assert_eq!(payload.meeting_type, MeetingType::ConsiglioDirettivo);
        assert_eq!(agenda.len(), 2);
        assert_eq!(agenda[0].title, "Approvazione bilancio");
        assert_eq!(agenda[0].description.as_deref(), Some("Bilancio 2025"));
        assert_eq!(agenda[1].title, "Varie ed eventuali");
        assert_eq!(agenda[1].description, None);
    }

    #[test]
    fn empty_agenda_titles_are_dropped() {
        let body = b"meeting_type=altra_riunione&meeting_date=2026-02-10&agenda_title=";
        let (_, agenda) = parse_meeting_form(body).expect("parse");
        assert!(agenda.is_empty());
    }
}
