//! Print pages: template pickers and print-ready HTML rendering.
//!
//! Templates come from two places: JSON files under the templates
//! directory (listed by the engine) and rows of the `print_templates`
//! table, which hold the same JSON document. A numeric template id in the
//! URL loads the database row; anything else is a file stem.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, Query, State},
    response::Html,
    routing::get,
};
use serde::Deserialize;
use serde_json::Value;
use tower_sessions::Session;

use easyvol_core::{
    Action, EventId, JuniorMemberId, MeetingId, MemberId, Module, PrintTemplateId, VehicleId,
};

use crate::db::print_templates::PrintTemplateRecord;
use crate::db::{
    EventRepository, JuniorMemberRepository, MeetingRepository, MemberRepository, Pagination,
    PrintTemplateRepository, VehicleRepository,
};
use crate::error::AppError;
use crate::filters;
use crate::middleware::AuthenticatedUser;
use crate::print::{PrintError, PrintTemplate, TemplateSummary};
use crate::routes::PageContext;
use crate::state::AppState;

/// Entity types the print subsystem renders.
const PRINTABLE_ENTITIES: &[&str] = &[
    "members",
    "junior_members",
    "events",
    "meetings",
    "vehicles",
];

/// Build the print router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/print/{entity}", get(picker))
        .route("/print/{entity}/{template}", get(render))
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "print/index.html")]
struct PrintPickerTemplate {
    ctx: PageContext,
    entity: String,
    file_templates: Vec<TemplateSummary>,
    db_templates: Vec<PrintTemplateRecord>,
}

// =============================================================================
// Request Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct PrintQuery {
    /// Record to print, required by `single` templates.
    #[serde(default, deserialize_with = "crate::models::forms::option_from_str")]
    id: Option<i32>,
}

// =============================================================================
// Route Handlers
// =============================================================================

fn check_entity(entity: &str) -> Result<(), AppError> {
    if PRINTABLE_ENTITIES.contains(&entity) {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("entità {entity}")))
    }
}

/// Template picker for one entity type.
///
/// GET /print/{entity}
async fn picker(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    session: Session,
    Path(entity): Path<String>,
) -> Result<PrintPickerTemplate, AppError> {
    auth.require(Module::PrintTemplates, Action::View)?;
    check_entity(&entity)?;

    let file_templates = state.print_engine().list(&entity)?;
    let db_templates = PrintTemplateRepository::new(state.pool())
        .list_for_entity(&entity)
        .await?;

    Ok(PrintPickerTemplate {
        ctx: PageContext::build(&state, &auth, &session, "/print").await?,
        entity,
        file_templates,
        db_templates,
    })
}

/// Render one template against live records, as a standalone print-ready
/// HTML document.
///
/// GET /print/{entity}/{template}?id={record}
async fn render(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path((entity, template_id)): Path<(String, String)>,
    Query(query): Query<PrintQuery>,
) -> Result<Html<String>, AppError> {
    auth.require(Module::PrintTemplates, Action::View)?;
    check_entity(&entity)?;

    let template = load_template(&state, &entity, &template_id).await?;
    let records = collect_records(&state, &entity, query.id).await?;
    let html = state.print_engine().render(&template, &records)?;
    Ok(Html(html))
}

/// Resolve a template identifier: numeric ids are database rows, anything
/// else is a file stem under the templates directory.
async fn load_template(
    state: &AppState,
    entity: &str,
    template_id: &str,
) -> Result<PrintTemplate, AppError> {
    if let Ok(id) = template_id.parse::<i32>() {
        let record = PrintTemplateRepository::new(state.pool())
            .get(PrintTemplateId::from(id))
            .await?;
        if record.entity_type != entity || !record.is_active {
            return Err(AppError::Print(PrintError::NotFound(template_id.to_string())));
        }
        let template =
            serde_json::from_value(record.document).map_err(|source| PrintError::Invalid {
                name: record.name,
                source,
            })?;
        return Ok(template);
    }

    Ok(state.print_engine().load(entity, template_id)?)
}

/// Walk every page of a list call, serializing each row.
macro_rules! collect_all {
    ($repo:expr) => {{
        let mut records = Vec::new();
        let mut page_no = 1;
        loop {
            let page = $repo
                .list(&Default::default(), Pagination::new(page_no, 100))
                .await?;
            for item in &page.items {
                records.push(to_record(item)?);
            }
            if !page.has_next() {
                break;
            }
            page_no += 1;
        }
        records
    }};
}

/// Fetch the records the template renders: one row when `id` is given,
/// every row of the entity otherwise.
async fn collect_records(
    state: &AppState,
    entity: &str,
    id: Option<i32>,
) -> Result<Vec<Value>, AppError> {
    let pool = state.pool();
    match (entity, id) {
        ("members", Some(id)) => Ok(vec![to_record(
            &MemberRepository::new(pool).get(MemberId::from(id)).await?,
        )?]),
        ("members", None) => Ok(collect_all!(MemberRepository::new(pool))),
        ("junior_members", Some(id)) => Ok(vec![to_record(
            &JuniorMemberRepository::new(pool)
                .get(JuniorMemberId::from(id))
                .await?,
        )?]),
        ("junior_members", None) => Ok(collect_all!(JuniorMemberRepository::new(pool))),
        ("events", Some(id)) => Ok(vec![to_record(
            &EventRepository::new(pool).get(EventId::from(id)).await?,
        )?]),
        ("events", None) => Ok(collect_all!(EventRepository::new(pool))),
        // A single meeting serializes as {meeting, agenda}, so templates
        // reach the agenda items through dotted paths.
        ("meetings", Some(id)) => Ok(vec![to_record(
            &MeetingRepository::new(pool).get(MeetingId::from(id)).await?,
        )?]),
        ("meetings", None) => Ok(collect_all!(MeetingRepository::new(pool))),
        ("vehicles", Some(id)) => Ok(vec![to_record(
            &VehicleRepository::new(pool)
                .get(VehicleId::from(id))
                .await?,
        )?]),
        ("vehicles", None) => Ok(collect_all!(VehicleRepository::new(pool))),
        (other, _) => Err(AppError::NotFound(format!("entità {other}"))),
    }
}

fn to_record<T: serde::Serialize>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(format!("serialize record: {e}")))
}
