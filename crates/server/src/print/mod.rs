//! Print template engine.
//!
//! Loads JSON-described layouts and substitutes record field values into
//! their HTML blocks, producing a complete print-ready HTML document. PDF
//! rasterization is left to the browser print pipeline; the server's
//! contract ends at the HTML.

pub mod model;

use std::path::{Path, PathBuf};

use chrono::{Datelike, Local};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::association::AssociationInfo;

pub use model::{Margins, PrintTemplate, TemplateKind, TemplateSummary};

const EACH_OPEN: &str = "{{#each records}}";
const EACH_CLOSE: &str = "{{/each}}";
const PAGE_BREAK: &str = "<div class=\"page-break\" style=\"page-break-after: always;\"></div>";

/// Print subsystem errors.
#[derive(Debug, Error)]
pub enum PrintError {
    /// No template file with the requested name.
    #[error("Modello di stampa non trovato: {0}")]
    NotFound(String),

    /// Template identifier contains path separators or traversal.
    #[error("Nome del modello non valido")]
    InvalidName,

    /// Template file exists but could not be read.
    #[error("Failed to read template {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Template file is not valid JSON for the template schema.
    #[error("Invalid template {name}: {source}")]
    Invalid {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Renders print templates against record data.
///
/// Holds the templates directory and the association letterhead injected
/// into every render as ambient fields.
#[derive(Clone)]
pub struct TemplateEngine {
    templates_dir: PathBuf,
    association: AssociationInfo,
}

impl TemplateEngine {
    /// Create an engine rooted at the given templates directory.
    #[must_use]
    pub const fn new(templates_dir: PathBuf, association: AssociationInfo) -> Self {
        Self {
            templates_dir,
            association,
        }
    }

    /// List the templates available for one entity type.
    ///
    /// A missing entity directory is an empty list, not an error: a fresh
    /// installation has no templates yet.
    ///
    /// # Errors
    ///
    /// Returns `PrintError::Io` when the directory exists but cannot be
    /// read, and `PrintError::Invalid` for unparseable template files.
    pub fn list(&self, entity: &str) -> Result<Vec<TemplateSummary>, PrintError> {
        validate_name(entity)?;
        let dir = self.templates_dir.join(entity);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&dir).map_err(|source| PrintError::Io {
            name: entity.to_string(),
            source,
        })?;

        let mut summaries = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| PrintError::Io {
                name: entity.to_string(),
                source,
            })?;
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let template = load_file(&path, stem)?;
            summaries.push(TemplateSummary {
                id: stem.to_string(),
                name: template.name,
                description: template.description,
                kind: template.kind,
            });
        }
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }

    /// Load one template by entity type and file stem.
    ///
    /// # Errors
    ///
    /// Returns `PrintError::NotFound` when the file does not exist and
    /// `PrintError::InvalidName` for identifiers containing path
    /// separators.
    pub fn load(&self, entity: &str, id: &str) -> Result<PrintTemplate, PrintError> {
        validate_name(entity)?;
        validate_name(id)?;
        let path = self.templates_dir.join(entity).join(format!("{id}.json"));
        if !path.is_file() {
            return Err(PrintError::NotFound(id.to_string()));
        }
        load_file(&path, id)
    }

    /// Render a template against its records, producing a full HTML
    /// document.
    ///
    /// `single` consumes the first record; `list` renders all records into
    /// one page via the `{{#each records}}` block; `multi_page` repeats the
    /// whole block per record with page breaks between.
    ///
    /// # Errors
    ///
    /// Returns `PrintError::NotFound` when a `single` render receives no
    /// records.
    pub fn render(&self, template: &PrintTemplate, records: &[Value]) -> Result<String, PrintError> {
        let ambient = self.ambient_fields();

        let body = match template.kind {
            TemplateKind::Single => {
                let record = records
                    .first()
                    .ok_or_else(|| PrintError::NotFound(template.name.clone()))?;
                substitute(&template.html, &merge_context(&ambient, record))
            }
            TemplateKind::List => {
                let mut context = ambient.clone();
                context.insert("total".to_string(), Value::from(records.len()));
                render_each_blocks(&template.html, records, &ambient, &Value::Object(context))
            }
            TemplateKind::MultiPage => records
                .iter()
                .map(|record| substitute(&template.html, &merge_context(&ambient, record)))
                .collect::<Vec<_>>()
                .join(PAGE_BREAK),
        };

        Ok(wrap_document(template, &body))
    }

    /// Ambient fields available to every template: the association
    /// letterhead plus the render date.
    fn ambient_fields(&self) -> Map<String, Value> {
        let now = Local::now();
        let mut map = Map::new();
        map.insert(
            "association".to_string(),
            serde_json::to_value(&self.association).unwrap_or(Value::Null),
        );
        map.insert(
            "current_date".to_string(),
            Value::String(now.format("%d/%m/%Y").to_string()),
        );
        map.insert(
            "current_year".to_string(),
            Value::String(now.year().to_string()),
        );
        map
    }
}

/// Template identifiers come from URLs; anything that could escape the
/// templates directory is rejected outright.
fn validate_name(name: &str) -> Result<(), PrintError> {
    if name.is_empty()
        || name.contains(['/', '\\'])
        || name.contains("..")
        || name.starts_with('.')
    {
        return Err(PrintError::InvalidName);
    }
    Ok(())
}

fn load_file(path: &Path, name: &str) -> Result<PrintTemplate, PrintError> {
    let raw = std::fs::read_to_string(path).map_err(|source| PrintError::Io {
        name: name.to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| PrintError::Invalid {
        name: name.to_string(),
        source,
    })
}

/// Record fields at the top level plus the ambient fields.
fn merge_context(ambient: &Map<String, Value>, record: &Value) -> Value {
    let mut map = ambient.clone();
    if let Value::Object(fields) = record {
        for (key, value) in fields {
            map.insert(key.clone(), value.clone());
        }
    }
    Value::Object(map)
}

/// Expand every `{{#each records}}...{{/each}}` block, then substitute the
/// remaining placeholders against the outer context.
fn render_each_blocks(
    html: &str,
    records: &[Value],
    ambient: &Map<String, Value>,
    outer: &Value,
) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(open) = rest.find(EACH_OPEN) {
        out.push_str(&substitute(&rest[..open], outer));
        let after_open = &rest[open + EACH_OPEN.len()..];
        let Some(close) = after_open.find(EACH_CLOSE) else {
            // Unterminated block: render the marker literally.
            out.push_str(&substitute(&rest[open..], outer));
            return out;
        };
        let inner = &after_open[..close];
        for record in records {
            out.push_str(&substitute(inner, &merge_context(ambient, record)));
        }
        rest = &after_open[close + EACH_CLOSE.len()..];
    }

    out.push_str(&substitute(rest, outer));
    out
}

/// Replace every `{{path.to.field}}` with the HTML-escaped value from the
/// context. Missing fields render empty.
fn substitute(html: &str, context: &Value) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let token = after[..end].trim();
        out.push_str(&escape_html(&lookup(context, token)));
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

/// Resolve a dotted path against a JSON object tree.
fn lookup(context: &Value, path: &str) -> String {
    let mut current = context;
    for segment in path.split('.') {
        match current.get(segment) {
            Some(value) => current = value,
            None => return String::new(),
        }
    }
    match current {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap the rendered body in a complete HTML document with the page
/// geometry as an `@page` rule.
fn wrap_document(template: &PrintTemplate, body: &str) -> String {
    let margins = &template.margins;
    format!(
        "<!DOCTYPE html>\n<html lang=\"it\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>\n\
         @page {{ size: {format} {orientation}; margin: {top} {right} {bottom} {left}; }}\n\
         body {{ font-family: sans-serif; }}\n\
         {css}\n</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        title = escape_html(&template.name),
        format = escape_html(&template.format),
        orientation = escape_html(&template.orientation),
        top = margins.top,
        right = margins.right,
        bottom = margins.bottom,
        left = margins.left,
        css = template.css,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine() -> TemplateEngine {
        TemplateEngine::new(PathBuf::from("print_templates"), association())
    }

    fn association() -> AssociationInfo {
        AssociationInfo {
            name: "P.A. Croce Verde".to_string(),
            address: Some("Via Roma 1".to_string()),
            city: Some("Torino".to_string()),
            province: Some("TO".to_string()),
            postal_code: Some("10100".to_string()),
            tax_code: None,
            email: None,
            phone: None,
        }
    }

    fn template(kind: TemplateKind, html: &str) -> PrintTemplate {
        PrintTemplate {
            name: "Prova".to_string(),
            description: None,
            kind,
            format: "A4".to_string(),
            orientation: "portrait".to_string(),
            margins: Margins::default(),
            html: html.to_string(),
            css: String::new(),
        }
    }

    #[test]
    fn single_substitutes_and_escapes_fields() {
        let t = template(TemplateKind::Single, "<p>{{last_name}} {{first_name}}</p>");
        let record = json!({"first_name": "Maria", "last_name": "D'Angelo <snc>"});

        let html = engine().render(&t, &[record]).expect("render");
        assert!(html.contains("<p>D&#39;Angelo &lt;snc&gt; Maria</p>"));
    }

    #[test]
    fn dotted_paths_and_ambient_fields_resolve() {
        let t = template(
            TemplateKind::Single,
            "{{association.name}} - {{contact.email}} - {{current_year}}",
        );
        let record = json!({"contact": {"email": "a@b.it"}});

        let html = engine().render(&t, &[record]).expect("render");
        assert!(html.contains("P.A. Croce Verde - a@b.it -"));
    }

    #[test]
    fn missing_fields_render_empty() {
        let t = template(TemplateKind::Single, "[{{nonexistent.field}}]");
        let html = engine().render(&t, &[json!({})]).expect("render");
        assert!(html.contains("[]"));
    }

    #[test]
    fn list_expands_each_block_and_total() {
        let t = template(
            TemplateKind::List,
            "Totale: {{total}}<ul>{{#each records}}<li>{{name}}</li>{{/each}}</ul>",
        );
        let records = vec![json!({"name": "Anna"}), json!({"name": "Bruno"})];

        let html = engine().render(&t, &records).expect("render");
        assert!(html.contains("Totale: 2"));
        assert!(html.contains("<li>Anna</li><li>Bruno</li>"));
    }

    #[test]
    fn multi_page_joins_records_with_page_breaks() {
        let t = template(TemplateKind::MultiPage, "<div>{{name}}</div>");
        let records = vec![json!({"name": "Anna"}), json!({"name": "Bruno"})];

        let html = engine().render(&t, &records).expect("render");
        assert!(html.contains("page-break-after: always"));
        assert!(html.contains("<div>Anna</div>"));
        assert!(html.contains("<div>Bruno</div>"));
    }

    #[test]
    fn single_without_records_is_an_error() {
        let t = template(TemplateKind::Single, "x");
        assert!(engine().render(&t, &[]).is_err());
    }

    #[test]
    fn traversal_names_are_rejected() {
        let e = engine();
        assert!(matches!(
            e.load("members", "../secrets"),
            Err(PrintError::InvalidName)
        ));
        assert!(matches!(
            e.load("members/../../etc", "x"),
            Err(PrintError::InvalidName)
        ));
    }
}
