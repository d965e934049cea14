//! The JSON print template format.
//!
//! A template is a self-contained JSON document describing one printable
//! layout: page geometry, an HTML block with `{{field}}` placeholders and
//! optional CSS. Templates live as `.json` files under the configured
//! templates directory, one subdirectory per entity type.

use serde::{Deserialize, Serialize};

/// How a template consumes its input records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    /// One record, one document (e.g. a membership certificate).
    Single,
    /// All records rendered into one document, with a
    /// `{{#each records}}...{{/each}}` row block (e.g. the member book).
    List,
    /// The whole HTML block repeated once per record, pages separated by
    /// page breaks (e.g. a badge per member).
    MultiPage,
}

/// Page margins, CSS lengths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Margins {
    #[serde(default = "default_margin")]
    pub top: String,
    #[serde(default = "default_margin")]
    pub right: String,
    #[serde(default = "default_margin")]
    pub bottom: String,
    #[serde(default = "default_margin")]
    pub left: String,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: default_margin(),
            right: default_margin(),
            bottom: default_margin(),
            left: default_margin(),
        }
    }
}

fn default_margin() -> String {
    "10mm".to_string()
}

fn default_format() -> String {
    "A4".to_string()
}

fn default_orientation() -> String {
    "portrait".to_string()
}

/// One print template document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintTemplate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: TemplateKind,
    /// Paper size, a CSS `@page size` keyword ("A4", "A5"...).
    #[serde(default = "default_format")]
    pub format: String,
    /// "portrait" or "landscape".
    #[serde(default = "default_orientation")]
    pub orientation: String,
    #[serde(default)]
    pub margins: Margins,
    /// HTML block with `{{field}}` placeholders; dotted paths allowed.
    pub html: String,
    #[serde(default)]
    pub css: String,
}

/// Name and description of an available template, for the picker page.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateSummary {
    /// File stem, used as the template identifier in URLs.
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub kind: TemplateKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_deserializes_with_defaults() {
        let json = r#"{
            "name": "Tesserino",
            "type": "multi_page",
            "html": "<div>{{first_name}} {{last_name}}</div>"
        }"#;

        let template: PrintTemplate = serde_json::from_str(json).expect("valid template");
        assert_eq!(template.kind, TemplateKind::MultiPage);
        assert_eq!(template.format, "A4");
        assert_eq!(template.orientation, "portrait");
        assert_eq!(template.margins.top, "10mm");
        assert!(template.css.is_empty());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let json = r#"{"name": "x", "type": "booklet", "html": ""}"#;
        assert!(serde_json::from_str::<PrintTemplate>(json).is_err());
    }
}
