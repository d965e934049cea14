//! Activity log listing page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use tower_sessions::Session;

use easyvol_core::{Action, Module};

use crate::db::{ActivityLogRepository, Page, Pagination};
use crate::error::AppError;
use crate::filters;
use crate::middleware::AuthenticatedUser;
use crate::models::activity::{ActivityFilter, ActivityLogEntry};
use crate::routes::PageContext;
use crate::state::AppState;

/// Build the activity log router.
pub fn router() -> Router<AppState> {
    Router::new().route("/activity", get(list))
}

#[derive(Template, WebTemplate)]
#[template(path = "activity/list.html")]
struct ActivityListTemplate {
    ctx: PageContext,
    page: Page<ActivityLogEntry>,
    filter: ActivityFilter,
    modules: &'static [Module],
}

/// Filtered, paginated audit trail, newest first.
///
/// GET /activity
async fn list(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Query(filter): Query<ActivityFilter>,
    Query(pagination): Query<Pagination>,
) -> Result<ActivityListTemplate, AppError> {
    auth.require(Module::ActivityLogs, Action::View)?;

    let page = ActivityLogRepository::new(state.pool())
        .list(&filter, pagination)
        .await?;

    Ok(ActivityListTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/activity").await?,
        page,
        filter,
        modules: Module::all(),
    })
}
