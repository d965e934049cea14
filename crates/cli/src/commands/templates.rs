//! Print template export command.
//!
//! Older installations stored print layouts as rows in `print_templates`.
//! The server now reads file-backed templates first; this command moves
//! the database rows to JSON files the server can load, then deactivates
//! them so they disappear from the pickers.

use std::path::Path;

use easyvol_core::PrintTemplateId;
use serde_json::Value;

use super::CommandError;

#[derive(sqlx::FromRow)]
struct TemplateRow {
    id: PrintTemplateId,
    name: String,
    entity_type: String,
    document: Value,
}

/// Export every active database template to `<dir>/<entity_type>/`.
pub async fn export(dir: &Path) -> Result<(), CommandError> {
    let pool = super::connect().await?;

    let rows: Vec<TemplateRow> = sqlx::query_as(
        "SELECT id, name, entity_type, document
         FROM print_templates
         WHERE is_active
         ORDER BY entity_type, name",
    )
    .fetch_all(&pool)
    .await?;

    if rows.is_empty() {
        tracing::info!("No active database templates to export");
        return Ok(());
    }

    for row in &rows {
        let entity_dir = dir.join(&row.entity_type);
        std::fs::create_dir_all(&entity_dir)?;

        let file_name = format!("{}.json", slug(&row.name));
        let path = entity_dir.join(&file_name);
        std::fs::write(&path, serde_json::to_vec_pretty(&row.document)?)?;

        sqlx::query("UPDATE print_templates SET is_active = FALSE WHERE id = $1")
            .bind(row.id)
            .execute(&pool)
            .await?;

        tracing::info!("Exported template '{}' to {}", row.name, path.display());
    }

    tracing::info!("Exported {} templates", rows.len());
    Ok(())
}

/// Turn a template display name into a safe file stem.
fn slug(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::slug;

    #[test]
    fn slug_replaces_non_alphanumeric_characters() {
        assert_eq!(slug("Libro Soci (2024)"), "libro_soci__2024_");
        assert_eq!(slug("Verbale"), "verbale");
    }
}
