//! Newsletter pages: draft editing, recipient preview and the send action.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::Redirect,
    routing::{get, post},
};
use tower_sessions::Session;

use easyvol_core::{Action, Module, NewsletterId, NewsletterStatus};

use crate::db::{NewsletterRepository, Page, Pagination, RepositoryError};
use crate::error::AppError;
use crate::filters;
use crate::middleware::AuthenticatedUser;
use crate::models::newsletter::{
    Newsletter, NewsletterFilter, NewsletterPayload, NewsletterRecipient,
};
use crate::routes::{PageContext, record_activity};
use crate::state::AppState;

/// Build the newsletters router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/newsletters", get(list))
        .route("/newsletters/new", get(new_form).post(create))
        .route("/newsletters/{id}", get(show))
        .route("/newsletters/{id}/edit", get(edit_form).post(update))
        .route("/newsletters/{id}/delete", post(delete))
        .route("/newsletters/{id}/send", post(send))
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "newsletters/list.html")]
struct NewsletterListTemplate {
    ctx: PageContext,
    page: Page<Newsletter>,
    filter: NewsletterFilter,
    statuses: &'static [NewsletterStatus],
}

#[derive(Template, WebTemplate)]
#[template(path = "newsletters/show.html")]
struct NewsletterShowTemplate {
    ctx: PageContext,
    newsletter: Newsletter,
    recipients: Vec<NewsletterRecipient>,
}

#[derive(Template, WebTemplate)]
#[template(path = "newsletters/form.html")]
struct NewsletterFormTemplate {
    ctx: PageContext,
    newsletter: Option<Newsletter>,
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Filtered, paginated newsletter list.
///
/// GET /newsletters
async fn list(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Query(filter): Query<NewsletterFilter>,
    Query(pagination): Query<Pagination>,
) -> Result<NewsletterListTemplate, AppError> {
    auth.require(Module::Newsletters, Action::View)?;

    let page = NewsletterRepository::new(state.pool())
        .list(&filter, pagination)
        .await?;

    Ok(NewsletterListTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/newsletters").await?,
        page,
        filter,
        statuses: NewsletterStatus::all(),
    })
}

/// Newsletter detail with its recorded recipients.
///
/// GET /newsletters/{id}
async fn show(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Path(id): Path<NewsletterId>,
) -> Result<NewsletterShowTemplate, AppError> {
    auth.require(Module::Newsletters, Action::View)?;

    let repo = NewsletterRepository::new(state.pool());
    let newsletter = repo.get(id).await?;
    let recipients = repo.recipients(id).await?;

    Ok(NewsletterShowTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/newsletters").await?,
        newsletter,
        recipients,
    })
}

/// Blank draft form.
///
/// GET /newsletters/new
async fn new_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
) -> Result<NewsletterFormTemplate, AppError> {
    auth.require(Module::Newsletters, Action::Create)?;

    Ok(NewsletterFormTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/newsletters").await?,
        newsletter: None,
    })
}

/// Create a draft.
///
/// POST /newsletters/new
async fn create(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Form(payload): Form<NewsletterPayload>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Newsletters, Action::Create)?;

    let newsletter = NewsletterRepository::new(state.pool())
        .create(&payload, auth.user.id)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Newsletters,
        Action::Create,
        Some(newsletter.id.as_i32()),
        format!("Creata newsletter \"{}\"", newsletter.subject),
    )
    .await;

    Ok(Redirect::to("/newsletters"))
}

/// Pre-filled draft form. Sent newsletters are frozen and cannot be edited.
///
/// GET /newsletters/{id}/edit
async fn edit_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Path(id): Path<NewsletterId>,
) -> Result<NewsletterFormTemplate, AppError> {
    auth.require(Module::Newsletters, Action::Edit)?;

    let newsletter = NewsletterRepository::new(state.pool()).get(id).await?;

    Ok(NewsletterFormTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/newsletters").await?,
        newsletter: Some(newsletter),
    })
}

/// Update a draft; a newsletter that is no longer a draft is not touched.
///
/// POST /newsletters/{id}/edit
async fn update(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<NewsletterId>,
    Form(payload): Form<NewsletterPayload>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Newsletters, Action::Edit)?;

    let newsletter = NewsletterRepository::new(state.pool())
        .update_draft(id, &payload)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Newsletters,
        Action::Edit,
        Some(newsletter.id.as_i32()),
        format!("Aggiornata newsletter \"{}\"", newsletter.subject),
    )
    .await;

    Ok(Redirect::to("/newsletters"))
}

/// Delete a draft.
///
/// POST /newsletters/{id}/delete
async fn delete(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<NewsletterId>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Newsletters, Action::Delete)?;

    NewsletterRepository::new(state.pool())
        .delete_draft(id)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Newsletters,
        Action::Delete,
        Some(id.as_i32()),
        format!("Eliminata newsletter id {}", id.as_i32()),
    )
    .await;

    Ok(Redirect::to("/newsletters"))
}

/// Send a draft to every active member with an email contact.
///
/// Delivery failures are logged per address and do not abort the batch;
/// the newsletter is marked sent with the recipients that were attempted.
///
/// POST /newsletters/{id}/send
async fn send(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<NewsletterId>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Newsletters, Action::Send)?;

    let Some(mailer) = state.mailer() else {
        return Err(AppError::Upstream("SMTP non configurato".to_string()));
    };

    let repo = NewsletterRepository::new(state.pool());
    let newsletter = repo.get(id).await?;
    if newsletter.status != NewsletterStatus::Draft {
        return Err(AppError::Database(RepositoryError::Conflict(
            "newsletter già inviata".to_string(),
        )));
    }

    let addresses = repo.active_member_addresses().await?;
    let mut recipients: Vec<(String, Option<String>)> = Vec::with_capacity(addresses.len());
    for (email, name) in addresses {
        if let Err(e) = mailer
            .send_html(
                &email,
                &newsletter.subject,
                &newsletter.body_html,
                newsletter.reply_to.as_deref(),
            )
            .await
        {
            tracing::warn!(email = %email, "Newsletter delivery failed: {e}");
        }
        recipients.push((email, Some(name)));
    }

    repo.mark_sent(id, &recipients).await?;
    tracing::info!(
        newsletter_id = id.as_i32(),
        recipients = recipients.len(),
        "Newsletter sent"
    );

    record_activity(
        &state,
        &auth,
        Module::Newsletters,
        Action::Send,
        Some(id.as_i32()),
        format!(
            "Inviata newsletter \"{}\" a {} destinatari",
            newsletter.subject,
            recipients.len()
        ),
    )
    .await;

    Ok(Redirect::to("/newsletters"))
}
