//! Bulk loading of the ingredient catalog from a JSON file.

use std::path::Path;

use anyhow::Context;
use diesel::prelude::*;

use crate::models::NewIngredient;
use crate::schema::ingredients;

const BATCH_SIZE: usize = 1000;

/// Reads `[{"name": ..., "measurement_unit": ...}]` from `path`.
pub fn read_catalog(path: &Path) -> anyhow::Result<Vec<NewIngredient>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_catalog(&raw).with_context(|| format!("Invalid catalog in {}", path.display()))
}

fn parse_catalog(raw: &str) -> anyhow::Result<Vec<NewIngredient>> {
    let entries: Vec<NewIngredient> = serde_json::from_str(raw)?;
    Ok(entries
        .into_iter()
        .map(|entry| NewIngredient {
            name: entry.name.trim().to_string(),
            measurement_unit: entry.measurement_unit.trim().to_string(),
        })
        .filter(|entry| !entry.name.is_empty() && !entry.measurement_unit.is_empty())
        .collect())
}

/// Inserts the entries, skipping any `(name, measurement_unit)` already present.
/// Returns how many rows were new.
pub fn import_ingredients(
    conn: &mut PgConnection,
    entries: &[NewIngredient],
) -> QueryResult<usize> {
    conn.transaction(|conn| {
        let mut inserted = 0;
        for chunk in entries.chunks(BATCH_SIZE) {
            inserted += diesel::insert_into(ingredients::table)
                .values(chunk)
                .on_conflict((ingredients::name, ingredients::measurement_unit))
                .do_nothing()
                .execute(conn)?;
        }
        tracing::info!(total = entries.len(), inserted, "imported ingredient catalog");
        Ok(inserted)
    })
}
