//! Association header data shown on every page and print.

use serde::{Deserialize, Serialize};

/// The single-row association record: letterhead data for page headers and
/// print templates.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AssociationInfo {
    /// Legal name of the association.
    pub name: String,
    /// Street address of the registered office.
    pub address: Option<String>,
    /// City of the registered office.
    pub city: Option<String>,
    /// Province abbreviation (e.g. "TO").
    pub province: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// Fiscal code of the association itself.
    pub tax_code: Option<String>,
    /// Contact email shown in footers.
    pub email: Option<String>,
    /// Contact phone shown in footers.
    pub phone: Option<String>,
}

impl AssociationInfo {
    /// Fallback record used until the association row is configured, so the
    /// server still renders pages against a freshly migrated database.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            name: "Associazione".to_string(),
            address: None,
            city: None,
            province: None,
            postal_code: None,
            tax_code: None,
            email: None,
            phone: None,
        }
    }
}
