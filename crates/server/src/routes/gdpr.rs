//! GDPR pages: controller appointments, privacy consents and the data
//! processing registry (art. 30 record).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::Redirect,
    routing::{get, post},
};
use tower_sessions::Session;

use easyvol_core::{Action, AppointmentId, ConsentId, Module, RegistryEntryId};

use crate::db::{GdprRepository, Page, Pagination};
use crate::error::AppError;
use crate::filters;
use crate::middleware::AuthenticatedUser;
use crate::models::gdpr::{
    AppointmentPayload, Consent, ConsentPayload, ControllerAppointment, RegistryEntry,
    RegistryEntryPayload,
};
use crate::routes::{PageContext, record_activity};
use crate::state::AppState;

/// Build the GDPR router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/gdpr/appointments", get(appointments))
        .route(
            "/gdpr/appointments/new",
            get(appointment_form).post(create_appointment),
        )
        .route("/gdpr/appointments/{id}/revoke", post(revoke_appointment))
        .route("/gdpr/consents", get(consents))
        .route("/gdpr/consents/new", get(consent_form).post(create_consent))
        .route("/gdpr/consents/{id}/revoke", post(revoke_consent))
        .route("/gdpr/registry", get(registry))
        .route(
            "/gdpr/registry/new",
            get(registry_new_form).post(create_registry_entry),
        )
        .route(
            "/gdpr/registry/{id}/edit",
            get(registry_edit_form).post(update_registry_entry),
        )
        .route("/gdpr/registry/{id}/delete", post(delete_registry_entry))
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "gdpr/appointments.html")]
struct AppointmentListTemplate {
    ctx: PageContext,
    page: Page<ControllerAppointment>,
}

#[derive(Template, WebTemplate)]
#[template(path = "gdpr/appointment_form.html")]
struct AppointmentFormTemplate {
    ctx: PageContext,
}

#[derive(Template, WebTemplate)]
#[template(path = "gdpr/consents.html")]
struct ConsentListTemplate {
    ctx: PageContext,
    page: Page<Consent>,
}

#[derive(Template, WebTemplate)]
#[template(path = "gdpr/consent_form.html")]
struct ConsentFormTemplate {
    ctx: PageContext,
}

#[derive(Template, WebTemplate)]
#[template(path = "gdpr/registry.html")]
struct RegistryListTemplate {
    ctx: PageContext,
    page: Page<RegistryEntry>,
}

#[derive(Template, WebTemplate)]
#[template(path = "gdpr/registry_form.html")]
struct RegistryFormTemplate {
    ctx: PageContext,
    entry: Option<RegistryEntry>,
}

// =============================================================================
// Controller appointments
// =============================================================================

/// Appointment list, active first.
///
/// GET /gdpr/appointments
async fn appointments(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Query(pagination): Query<Pagination>,
) -> Result<AppointmentListTemplate, AppError> {
    auth.require(Module::Gdpr, Action::View)?;

    let page = GdprRepository::new(state.pool())
        .list_appointments(pagination)
        .await?;

    Ok(AppointmentListTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/gdpr/appointments").await?,
        page,
    })
}

/// Blank appointment form.
///
/// GET /gdpr/appointments/new
async fn appointment_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
) -> Result<AppointmentFormTemplate, AppError> {
    auth.require(Module::Gdpr, Action::Create)?;

    Ok(AppointmentFormTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/gdpr/appointments").await?,
    })
}

/// Record a controller/processor appointment.
///
/// POST /gdpr/appointments/new
async fn create_appointment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Form(payload): Form<AppointmentPayload>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Gdpr, Action::Create)?;

    let appointment = GdprRepository::new(state.pool())
        .create_appointment(&payload, auth.user.id)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Gdpr,
        Action::Create,
        Some(appointment.id.as_i32()),
        format!("Registrata nomina {}", appointment.appointment_type),
    )
    .await;

    Ok(Redirect::to("/gdpr/appointments"))
}

/// Revoke an appointment: sets the revocation date and clears the active
/// flag.
///
/// POST /gdpr/appointments/{id}/revoke
async fn revoke_appointment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<AppointmentId>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Gdpr, Action::Edit)?;

    GdprRepository::new(state.pool())
        .revoke_appointment(id)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Gdpr,
        Action::Edit,
        Some(id.as_i32()),
        format!("Revocata nomina id {}", id.as_i32()),
    )
    .await;

    Ok(Redirect::to("/gdpr/appointments"))
}

// =============================================================================
// Privacy consents
// =============================================================================

/// Consent list, newest first.
///
/// GET /gdpr/consents
async fn consents(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Query(pagination): Query<Pagination>,
) -> Result<ConsentListTemplate, AppError> {
    auth.require(Module::Gdpr, Action::View)?;

    let page = GdprRepository::new(state.pool())
        .list_consents(pagination)
        .await?;

    Ok(ConsentListTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/gdpr/consents").await?,
        page,
    })
}

/// Blank consent form.
///
/// GET /gdpr/consents/new
async fn consent_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
) -> Result<ConsentFormTemplate, AppError> {
    auth.require(Module::Gdpr, Action::Create)?;

    Ok(ConsentFormTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/gdpr/consents").await?,
    })
}

/// Record a consent for a member or junior member.
///
/// POST /gdpr/consents/new
async fn create_consent(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Form(payload): Form<ConsentPayload>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Gdpr, Action::Create)?;

    let consent = GdprRepository::new(state.pool())
        .create_consent(&payload, auth.user.id)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Gdpr,
        Action::Create,
        Some(consent.id.as_i32()),
        format!(
            "Registrato consenso {} per {} id {}",
            consent.consent_type, consent.entity_type, consent.entity_id
        ),
    )
    .await;

    Ok(Redirect::to("/gdpr/consents"))
}

/// Revoke a consent, keeping the row for the audit trail.
///
/// POST /gdpr/consents/{id}/revoke
async fn revoke_consent(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<ConsentId>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Gdpr, Action::Edit)?;

    GdprRepository::new(state.pool()).revoke_consent(id).await?;

    record_activity(
        &state,
        &auth,
        Module::Gdpr,
        Action::Edit,
        Some(id.as_i32()),
        format!("Revocato consenso id {}", id.as_i32()),
    )
    .await;

    Ok(Redirect::to("/gdpr/consents"))
}

// =============================================================================
// Processing registry
// =============================================================================

/// Processing registry list.
///
/// GET /gdpr/registry
async fn registry(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Query(pagination): Query<Pagination>,
) -> Result<RegistryListTemplate, AppError> {
    auth.require(Module::Gdpr, Action::View)?;

    let page = GdprRepository::new(state.pool())
        .list_registry(pagination)
        .await?;

    Ok(RegistryListTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/gdpr/registry").await?,
        page,
    })
}

/// Blank registry entry form.
///
/// GET /gdpr/registry/new
async fn registry_new_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
) -> Result<RegistryFormTemplate, AppError> {
    auth.require(Module::Gdpr, Action::Create)?;

    Ok(RegistryFormTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/gdpr/registry").await?,
        entry: None,
    })
}

/// Create a registry entry. A missing processing purpose is rejected with
/// "La finalità del trattamento è obbligatoria" before any write.
///
/// POST /gdpr/registry/new
async fn create_registry_entry(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Form(payload): Form<RegistryEntryPayload>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Gdpr, Action::Create)?;

    let entry = GdprRepository::new(state.pool())
        .create_registry_entry(&payload, auth.user.id)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Gdpr,
        Action::Create,
        Some(entry.id.as_i32()),
        format!("Creato trattamento \"{}\"", entry.processing_name),
    )
    .await;

    Ok(Redirect::to("/gdpr/registry"))
}

/// Pre-filled registry entry form.
///
/// GET /gdpr/registry/{id}/edit
async fn registry_edit_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Path(id): Path<RegistryEntryId>,
) -> Result<RegistryFormTemplate, AppError> {
    auth.require(Module::Gdpr, Action::Edit)?;

    let entry = GdprRepository::new(state.pool())
        .get_registry_entry(id)
        .await?;

    Ok(RegistryFormTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/gdpr/registry").await?,
        entry: Some(entry),
    })
}

/// Update a registry entry, with the same purpose check as create.
///
/// POST /gdpr/registry/{id}/edit
async fn update_registry_entry(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<RegistryEntryId>,
    Form(payload): Form<RegistryEntryPayload>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Gdpr, Action::Edit)?;

    let entry = GdprRepository::new(state.pool())
        .update_registry_entry(id, &payload)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Gdpr,
        Action::Edit,
        Some(entry.id.as_i32()),
        format!("Aggiornato trattamento \"{}\"", entry.processing_name),
    )
    .await;

    Ok(Redirect::to("/gdpr/registry"))
}

/// Delete a registry entry.
///
/// POST /gdpr/registry/{id}/delete
async fn delete_registry_entry(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<RegistryEntryId>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Gdpr, Action::Delete)?;

    GdprRepository::new(state.pool())
        .delete_registry_entry(id)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Gdpr,
        Action::Delete,
        Some(id.as_i32()),
        format!("Eliminato trattamento id {}", id.as_i32()),
    )
    .await;

    Ok(Redirect::to("/gdpr/registry"))
}
