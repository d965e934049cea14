//! Login, logout and password change.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::db::users::{UserRepository, hash_password, verify_password};
use crate::error::AppError;
use crate::middleware::{AuthenticatedUser, csrf};
use crate::models::session::{CurrentUser, keys};
use crate::models::user::{DEFAULT_PASSWORD, MIN_PASSWORD_LENGTH};
use crate::state::AppState;

/// Shown on a failed login; deliberately does not say which part was wrong.
const INVALID_CREDENTIALS_MESSAGE: &str = "Credenziali non valide";

/// Shown when the new password is the seeded default.
const DEFAULT_PASSWORD_MESSAGE: &str =
    "Non puoi utilizzare la password predefinita. Scegli una password diversa.";

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
        .route(
            "/password/change",
            get(change_password_page).post(change_password),
        )
}

// =============================================================================
// Templates
// =============================================================================

/// Standalone login page (no sidebar).
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
struct LoginTemplate {
    association_name: String,
    csrf_token: String,
    error: Option<String>,
}

/// Standalone password change page, used both voluntarily and when the
/// seeded default password forces a change.
#[derive(Template, WebTemplate)]
#[template(path = "auth/change_password.html")]
struct ChangePasswordTemplate {
    association_name: String,
    csrf_token: String,
    forced: bool,
    error: Option<String>,
}

// =============================================================================
// Request Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordForm {
    current_password: String,
    new_password: String,
    confirm_password: String,
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Login form.
///
/// GET /login
async fn login_page(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    // Already authenticated sessions go straight to the dashboard
    let current: Option<CurrentUser> = session
        .get(keys::CURRENT_USER)
        .await
        .map_err(|e| AppError::Internal(format!("session load: {e}")))?;
    if current.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let template = LoginTemplate {
        association_name: state.association().name.clone(),
        csrf_token: csrf::token(&session).await?,
        error: None,
    };
    Ok(template.into_response())
}

/// Authenticate and open a session.
///
/// POST /login
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let repo = UserRepository::new(state.pool());
    let user = repo.get_active_by_username(form.username.trim()).await?;

    let Some(user) = user.filter(|u| verify_password(&form.password, &u.password_hash)) else {
        tracing::info!(username = %form.username, "Failed login attempt");
        let template = LoginTemplate {
            association_name: state.association().name.clone(),
            csrf_token: csrf::token(&session).await?,
            error: Some(INVALID_CREDENTIALS_MESSAGE.to_string()),
        };
        return Ok(template.into_response());
    };

    let role_name = match user.role_id {
        Some(role_id) => repo.role_name(role_id).await?,
        None => None,
    };

    // New session ID on privilege change
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("session cycle: {e}")))?;

    let current = CurrentUser {
        id: user.id,
        username: user.username.clone(),
        full_name: user.full_name.clone().unwrap_or_else(|| user.username.clone()),
        role_id: user.role_id,
        role_name,
        must_change_password: user.must_change_password,
    };
    session
        .insert(keys::CURRENT_USER, current)
        .await
        .map_err(|e| AppError::Internal(format!("session store: {e}")))?;

    repo.touch_last_login(user.id).await?;
    tracing::info!(username = %user.username, "User logged in");

    if user.must_change_password {
        Ok(Redirect::to("/password/change").into_response())
    } else {
        Ok(Redirect::to("/").into_response())
    }
}

/// Close the session.
///
/// POST /logout
async fn logout(session: Session) -> Result<Redirect, AppError> {
    session
        .flush()
        .await
        .map_err(|e| AppError::Internal(format!("session flush: {e}")))?;
    Ok(Redirect::to("/login"))
}

/// Password change form.
///
/// GET /password/change
async fn change_password_page(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
) -> Result<ChangePasswordTemplate, AppError> {
    Ok(ChangePasswordTemplate {
        association_name: state.association().name.clone(),
        csrf_token: csrf::token(&session).await?,
        forced: auth.user.must_change_password,
        error: None,
    })
}

/// Change the password, enforcing the minimum length and the ban on the
/// seeded default.
///
/// POST /password/change
async fn change_password(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Form(form): Form<ChangePasswordForm>,
) -> Result<Response, AppError> {
    let repo = UserRepository::new(state.pool());
    let user = repo.get(auth.user.id).await?;

    let error = if !verify_password(&form.current_password, &user.password_hash) {
        Some("La password attuale non è corretta".to_string())
    } else if form.new_password != form.confirm_password {
        Some("Le password non coincidono".to_string())
    } else if form.new_password.len() < MIN_PASSWORD_LENGTH {
        Some(format!(
            "La password deve contenere almeno {MIN_PASSWORD_LENGTH} caratteri"
        ))
    } else if form.new_password == DEFAULT_PASSWORD {
        Some(DEFAULT_PASSWORD_MESSAGE.to_string())
    } else {
        None
    };

    if let Some(error) = error {
        let template = ChangePasswordTemplate {
            association_name: state.association().name.clone(),
            csrf_token: csrf::token(&session).await?,
            forced: auth.user.must_change_password,
            error: Some(error),
        };
        return Ok(template.into_response());
    }

    let hash = hash_password(&form.new_password)?;
    repo.set_password_hash(auth.user.id, &hash).await?;

    // Reflect the cleared flag in the session so the redirect loop ends
    let mut current = auth.user.clone();
    current.must_change_password = false;
    session
        .insert(keys::CURRENT_USER, current)
        .await
        .map_err(|e| AppError::Internal(format!("session store: {e}")))?;

    tracing::info!(username = %auth.user.username, "Password changed");
    Ok(Redirect::to("/").into_response())
}
