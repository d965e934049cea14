//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! GET  /login                    - Login page
//! POST /login                    - Authenticate
//! POST /logout                   - Logout
//! GET  /password/change          - Forced/voluntary password change form
//! POST /password/change          - Change password
//!
//! # Dashboard
//! GET  /                         - Dashboard overview
//!
//! # Registries (same shape per module)
//! GET  /members                  - Filtered, paginated list
//! GET  /members/new              - Create form
//! POST /members/new              - Create
//! GET  /members/{id}/edit        - Edit form
//! POST /members/{id}/edit        - Update
//! POST /members/{id}/delete      - Delete (soft where applicable)
//! ... junior-members, events, meetings, vehicles, newsletters,
//!     scheduler, users follow the same pattern ...
//!
//! # GDPR
//! GET/POST /gdpr/appointments[...]  - Controller appointments
//! GET/POST /gdpr/consents[...]      - Privacy consents
//! GET/POST /gdpr/registry[...]      - Processing registry (art. 30)
//!
//! # Operations center
//! GET  /operations               - Live dashboard (map, radios, roster)
//! GET/POST /operations/radios[...]  - Radio directory and assignments
//! POST /operations/on-call[...]     - On-call roster
//!
//! # Printing
//! GET  /print/{entity}              - Template picker
//! GET  /print/{entity}/{template}   - Rendered print-ready HTML
//!
//! # Polling APIs (JSON)
//! GET  /api/events/map           - Open events with coordinates
//! GET  /api/operations/status    - Radio assignments + on-call snapshot
//! GET  /api/earthquakes          - INGV feed proxy
//! ```

use axum::Router;
use tower_sessions::Session;

use easyvol_core::{Action, Module};

use crate::db::ActivityLogRepository;
use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::models::activity::ActivityEntry;
use crate::state::AppState;

pub mod activity;
pub mod api;
pub mod auth;
pub mod dashboard;
pub mod events;
pub mod gdpr;
pub mod junior_members;
pub mod meetings;
pub mod members;
pub mod newsletters;
pub mod operations;
pub mod print;
pub mod scheduler;
pub mod users;
pub mod vehicles;

/// Build the application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(members::router())
        .merge(junior_members::router())
        .merge(events::router())
        .merge(meetings::router())
        .merge(vehicles::router())
        .merge(gdpr::router())
        .merge(newsletters::router())
        .merge(scheduler::router())
        .merge(operations::router())
        .merge(users::router())
        .merge(print::router())
        .merge(activity::router())
        .merge(api::router())
}

/// Everything `base.html` needs: letterhead, identity, sidebar gating and
/// the CSRF token for forms.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub association_name: String,
    pub full_name: String,
    pub role_name: String,
    pub current_path: String,
    pub csrf_token: String,
    pub can_members: bool,
    pub can_junior_members: bool,
    pub can_users: bool,
    pub can_events: bool,
    pub can_meetings: bool,
    pub can_vehicles: bool,
    pub can_gdpr: bool,
    pub can_newsletters: bool,
    pub can_scheduler: bool,
    pub can_operations: bool,
    pub can_print_templates: bool,
    pub can_activity_logs: bool,
}

impl PageContext {
    /// Assemble the context for one rendered page.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the session store fails while
    /// fetching the CSRF token.
    pub async fn build(
        state: &AppState,
        auth: &AuthenticatedUser,
        session: &Session,
        current_path: &str,
    ) -> Result<Self, AppError> {
        let csrf_token = crate::middleware::csrf::token(session).await?;
        let view = |module| auth.can(module, Action::View);

        Ok(Self {
            association_name: state.association().name.clone(),
            full_name: auth.user.full_name.clone(),
            role_name: auth.user.role_name.clone().unwrap_or_default(),
            current_path: current_path.to_string(),
            csrf_token,
            can_members: view(Module::Members),
            can_junior_members: view(Module::JuniorMembers),
            can_users: view(Module::Users),
            can_events: view(Module::Events),
            can_meetings: view(Module::Meetings),
            can_vehicles: view(Module::Vehicles),
            can_gdpr: view(Module::Gdpr),
            can_newsletters: view(Module::Newsletters),
            can_scheduler: view(Module::Scheduler),
            can_operations: view(Module::Operations),
            can_print_templates: view(Module::PrintTemplates),
            can_activity_logs: view(Module::ActivityLogs),
        })
    }
}

/// Record an audit row for a completed mutation. A failed insert is logged
/// and never aborts the user's action.
pub(crate) async fn record_activity(
    state: &AppState,
    auth: &AuthenticatedUser,
    module: Module,
    action: Action,
    record_id: Option<i32>,
    description: String,
) {
    let entry = ActivityEntry {
        user_id: auth.user.id,
        module: module.as_str(),
        action: action.as_str(),
        record_id,
        description,
        ip_address: auth.ip_address.clone(),
        user_agent: auth.user_agent.clone(),
    };

    if let Err(e) = ActivityLogRepository::new(state.pool()).record(&entry).await {
        tracing::warn!("Failed to record activity log entry: {e}");
    }
}
