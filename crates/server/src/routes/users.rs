//! User account, role and permission pages.
//!
//! New accounts are seeded with the default password and forced to change
//! it on first login. The permission matrices post repeated
//! `permission_ids` checkboxes, parsed from the raw body.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, RawForm, State},
    response::Redirect,
    routing::{get, post},
};
use tower_sessions::Session;

use easyvol_core::{Action, Module, PermissionId, RoleId, UserId};

use crate::db::users::{PermissionRow, hash_password};
use crate::db::{Page, Pagination, UserRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::AuthenticatedUser;
use crate::models::user::{DEFAULT_PASSWORD, Role, RolePayload, User, UserFilter, UserPayload};
use crate::routes::{PageContext, record_activity};
use crate::state::AppState;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list))
        .route("/users/new", get(new_form).post(create))
        .route("/users/roles", get(roles).post(create_role))
        .route("/users/roles/{id}/delete", post(delete_role))
        .route(
            "/users/roles/{id}/permissions",
            get(role_permissions).post(set_role_permissions),
        )
        .route("/users/{id}/edit", get(edit_form).post(update))
        .route("/users/{id}/deactivate", post(deactivate))
        .route(
            "/users/{id}/permissions",
            get(user_permissions).post(set_user_permissions),
        )
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "users/list.html")]
struct UserListTemplate {
    ctx: PageContext,
    page: Page<User>,
    filter: UserFilter,
    roles: Vec<Role>,
}

#[derive(Template, WebTemplate)]
#[template(path = "users/form.html")]
struct UserFormTemplate {
    ctx: PageContext,
    user: Option<User>,
    roles: Vec<Role>,
}

#[derive(Template, WebTemplate)]
#[template(path = "users/roles.html")]
struct RoleListTemplate {
    ctx: PageContext,
    roles: Vec<Role>,
}

/// One row of the permission matrix.
struct MatrixRow {
    permission: PermissionRow,
    checked: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "users/permissions.html")]
struct PermissionMatrixTemplate {
    ctx: PageContext,
    /// Page heading: the role or user the matrix edits.
    subject: String,
    /// Form target ("/users/roles/3/permissions" or "/users/7/permissions").
    action_path: String,
    rows: Vec<MatrixRow>,
}

// =============================================================================
// Form parsing
// =============================================================================

/// Collect the checked `permission_ids` checkboxes from the raw body.
fn parse_permission_ids(bytes: &[u8]) -> Vec<PermissionId> {
    url::form_urlencoded::parse(bytes)
        .filter(|(key, _)| key == "permission_ids")
        .filter_map(|(_, value)| value.parse::<i32>().ok())
        .map(PermissionId::from)
        .collect()
}

fn matrix_rows(catalog: Vec<PermissionRow>, granted: &[PermissionId]) -> Vec<MatrixRow> {
    catalog
        .into_iter()
        .map(|permission| {
            let checked = granted.contains(&permission.id);
            MatrixRow {
                permission,
                checked,
            }
        })
        .collect()
}

// =============================================================================
// Accounts
// =============================================================================

/// Filtered, paginated account list.
///
/// GET /users
async fn list(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Query(filter): Query<UserFilter>,
    Query(pagination): Query<Pagination>,
) -> Result<UserListTemplate, AppError> {
    auth.require(Module::Users, Action::View)?;

    let repo = UserRepository::new(state.pool());
    let page = repo.list(&filter, pagination).await?;
    let roles = repo.list_roles().await?;

    Ok(UserListTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/users").await?,
        page,
        filter,
        roles,
    })
}

/// Blank account form.
///
/// GET /users/new
async fn new_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
) -> Result<UserFormTemplate, AppError> {
    auth.require(Module::Users, Action::Create)?;

    let roles = UserRepository::new(state.pool()).list_roles().await?;

    Ok(UserFormTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/users").await?,
        user: None,
        roles,
    })
}

/// Create an account seeded with the default password; the user must
/// change it on first login.
///
/// POST /users/new
async fn create(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Form(payload): Form<UserPayload>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Users, Action::Create)?;

    let password_hash = hash_password(DEFAULT_PASSWORD)?;
    let user = UserRepository::new(state.pool())
        .create(&payload, &password_hash, true)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Users,
        Action::Create,
        Some(user.id.as_i32()),
        format!("Creato utente {}", user.username),
    )
    .await;

    Ok(Redirect::to("/users"))
}

/// Pre-filled account form.
///
/// GET /users/{id}/edit
async fn edit_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Path(id): Path<UserId>,
) -> Result<UserFormTemplate, AppError> {
    auth.require(Module::Users, Action::Edit)?;

    let repo = UserRepository::new(state.pool());
    let user = repo.get(id).await?;
    let roles = repo.list_roles().await?;

    Ok(UserFormTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/users").await?,
        user: Some(user),
        roles,
    })
}

/// Update account fields (never the password).
///
/// POST /users/{id}/edit
async fn update(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<UserId>,
    Form(payload): Form<UserPayload>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Users, Action::Edit)?;

    let user = UserRepository::new(state.pool()).update(id, &payload).await?;

    record_activity(
        &state,
        &auth,
        Module::Users,
        Action::Edit,
        Some(user.id.as_i32()),
        format!("Aggiornato utente {}", user.username),
    )
    .await;

    Ok(Redirect::to("/users"))
}

/// Deactivate an account; the row stays for the audit trail.
///
/// POST /users/{id}/deactivate
async fn deactivate(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<UserId>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Users, Action::Delete)?;

    UserRepository::new(state.pool()).deactivate(id).await?;

    record_activity(
        &state,
        &auth,
        Module::Users,
        Action::Delete,
        Some(id.as_i32()),
        format!("Disattivato utente id {}", id.as_i32()),
    )
    .await;

    Ok(Redirect::to("/users"))
}

// =============================================================================
// Roles
// =============================================================================

/// Role list with the inline create form.
///
/// GET /users/roles
async fn roles(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
) -> Result<RoleListTemplate, AppError> {
    auth.require(Module::Users, Action::View)?;

    let roles = UserRepository::new(state.pool()).list_roles().await?;

    Ok(RoleListTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/users/roles").await?,
        roles,
    })
}

/// Create a role.
///
/// POST /users/roles
async fn create_role(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Form(payload): Form<RolePayload>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Users, Action::Create)?;

    let role = UserRepository::new(state.pool()).create_role(&payload).await?;

    record_activity(
        &state,
        &auth,
        Module::Users,
        Action::Create,
        Some(role.id.as_i32()),
        format!("Creato ruolo \"{}\"", role.name),
    )
    .await;

    Ok(Redirect::to("/users/roles"))
}

/// Delete a role.
///
/// POST /users/roles/{id}/delete
async fn delete_role(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<RoleId>,
) -> Result<Redirect, AppError> {
    auth.require(Module::Users, Action::Delete)?;

    UserRepository::new(state.pool()).delete_role(id).await?;

    record_activity(
        &state,
        &auth,
        Module::Users,
        Action::Delete,
        Some(id.as_i32()),
        format!("Eliminato ruolo id {}", id.as_i32()),
    )
    .await;

    Ok(Redirect::to("/users/roles"))
}

// =============================================================================
// Permission matrices
// =============================================================================

/// Permission matrix for a role.
///
/// GET /users/roles/{id}/permissions
async fn role_permissions(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Path(id): Path<RoleId>,
) -> Result<PermissionMatrixTemplate, AppError> {
    auth.require(Module::Users, Action::Edit)?;

    let repo = UserRepository::new(state.pool());
    let subject = repo
        .role_name(id)
        .await?
        .ok_or(AppError::NotFound("ruolo".to_string()))?;
    let catalog = repo.list_permissions().await?;
    let granted = repo.role_permission_ids(id).await?;

    Ok(PermissionMatrixTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/users/roles").await?,
        subject,
        action_path: format!("/users/roles/{}/permissions", id.as_i32()),
        rows: matrix_rows(catalog, &granted),
    })
}

/// Replace a role's grant set with the checked boxes.
///
/// POST /users/roles/{id}/permissions
async fn set_role_permissions(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<RoleId>,
    RawForm(bytes): RawForm,
) -> Result<Redirect, AppError> {
    auth.require(Module::Users, Action::Edit)?;

    let permission_ids = parse_permission_ids(&bytes);
    UserRepository::new(state.pool())
        .set_role_permissions(id, &permission_ids)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Users,
        Action::Edit,
        Some(id.as_i32()),
        format!(
            "Aggiornati permessi del ruolo id {} ({} concessi)",
            id.as_i32(),
            permission_ids.len()
        ),
    )
    .await;

    Ok(Redirect::to("/users/roles"))
}

/// Direct permission overrides for one account, on top of its role.
///
/// GET /users/{id}/permissions
async fn user_permissions(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Path(id): Path<UserId>,
) -> Result<PermissionMatrixTemplate, AppError> {
    auth.require(Module::Users, Action::Edit)?;

    let repo = UserRepository::new(state.pool());
    let user = repo.get(id).await?;
    let catalog = repo.list_permissions().await?;
    let granted = repo.user_permission_ids(id).await?;

    Ok(PermissionMatrixTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/users").await?,
        subject: user.username,
        action_path: format!("/users/{}/permissions", id.as_i32()),
        rows: matrix_rows(catalog, &granted),
    })
}

/// Replace a user's direct grants with the checked boxes.
///
/// POST /users/{id}/permissions
async fn set_user_permissions(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<UserId>,
    RawForm(bytes): RawForm,
) -> Result<Redirect, AppError> {
    auth.require(Module::Users, Action::Edit)?;

    let permission_ids = parse_permission_ids(&bytes);
    UserRepository::new(state.pool())
        .set_user_permissions(id, &permission_ids)
        .await?;

    record_activity(
        &state,
        &auth,
        Module::Users,
        Action::Edit,
        Some(id.as_i32()),
        format!(
            "Aggiornati permessi diretti dell'utente id {} ({} concessi)",
            id.as_i32(),
            permission_ids.len()
        ),
    )
    .await;

    Ok(Redirect::to("/users"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_ids_collects_repeated_checkboxes() {
        let body = b"csrf_token=abc&permission_ids=1&permission_ids=4&permission_ids=9";
        let ids = parse_permission_ids(body);
        assert_eq!(
            ids,
            vec![
                PermissionId::from(1),
                PermissionId::from(4),
                PermissionId::from(9)
            ]
        );
    }

    #[test]
    fn permission_ids_ignores_garbage_values() {
        let body = b"permission_ids=abc&permission_ids=2";
        assert_eq!(parse_permission_ids(body), vec![PermissionId::from(2)]);
    }
}
