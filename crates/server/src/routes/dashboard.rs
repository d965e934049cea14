//! Dashboard overview: counters, upcoming deadlines and the current on-call
//! roster.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, routing::get};
use tower_sessions::Session;

use easyvol_core::MemberStatus;

use crate::db::{EventRepository, MemberRepository, OperationsRepository, SchedulerRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::AuthenticatedUser;
use crate::models::member::MemberFilter;
use crate::models::operations::RosterShift;
use crate::models::scheduler::SchedulerItem;
use crate::routes::PageContext;
use crate::state::AppState;

/// Number of deadlines shown in the dashboard box.
const UPCOMING_DEADLINES: i64 = 5;

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    ctx: PageContext,
    active_members: i64,
    open_events: i64,
    upcoming: Vec<SchedulerItem>,
    roster: Vec<RosterShift>,
}

/// Dashboard overview.
///
/// GET /
async fn index(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
) -> Result<DashboardTemplate, AppError> {
    let active_filter = MemberFilter {
        status: Some(MemberStatus::Attivo),
        ..MemberFilter::default()
    };
    let active_members = MemberRepository::new(state.pool())
        .count(&active_filter)
        .await?;
    let open_events = EventRepository::new(state.pool()).count_open().await?;
    let upcoming = SchedulerRepository::new(state.pool())
        .upcoming(UPCOMING_DEADLINES)
        .await?;
    let roster = OperationsRepository::new(state.pool())
        .current_roster()
        .await?;

    Ok(DashboardTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/").await?,
        active_members,
        open_events,
        upcoming,
        roster,
    })
}
