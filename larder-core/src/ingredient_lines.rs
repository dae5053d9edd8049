//! Validation of the `ingredients` list submitted with a recipe.
//!
//! Raw entries arrive as untyped JSON so that every shape problem can be
//! reported with its position instead of a generic deserialization failure.
//! Checks run in a fixed order: empty list, per-entry shape, catalog
//! existence (one batch lookup for all ids), then duplicates.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BadReference, IngredientLineError};

/// One `(ingredient, amount)` pair that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientLine {
    pub ingredient_id: i32,
    pub amount: i32,
}

/// A non-empty, duplicate-free list of lines whose ingredients all exist.
///
/// Only [`validate_lines`] constructs this, so holding one is proof the
/// checks ran. Lines keep their submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLines(Vec<IngredientLine>);

impl ValidatedLines {
    pub fn lines(&self) -> &[IngredientLine] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ingredient_ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.iter().map(|line| line.ingredient_id)
    }
}

impl IntoIterator for ValidatedLines {
    type Item = IngredientLine;
    type IntoIter = std::vec::IntoIter<IngredientLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Read access to the ingredient catalog.
///
/// Implementations must answer for the whole id set in one round-trip.
pub trait IngredientCatalog {
    type Error;

    /// Returns the subset of `ids` present in the catalog.
    fn existing_ids(&mut self, ids: &BTreeSet<i32>) -> Result<BTreeSet<i32>, Self::Error>;
}

/// Checks the shape of every entry without touching the catalog.
///
/// Strict integers only: `"2"` and `2.0` are rejected.
pub fn parse_lines(raw: &[Value]) -> Result<Vec<IngredientLine>, IngredientLineError> {
    if raw.is_empty() {
        return Err(IngredientLineError::EmptyIngredientList);
    }

    raw.iter()
        .enumerate()
        .map(|(position, entry)| {
            let ingredient_id = positive_i32(entry.get("id")).ok_or(
                IngredientLineError::InvalidIngredientReference(BadReference::Malformed {
                    position,
                }),
            )?;
            let amount = positive_i32(entry.get("amount"))
                .ok_or(IngredientLineError::InvalidAmount { position })?;
            Ok(IngredientLine {
                ingredient_id,
                amount,
            })
        })
        .collect()
}

fn positive_i32(value: Option<&Value>) -> Option<i32> {
    let n = value?.as_i64()?;
    if n < 1 {
        return None;
    }
    i32::try_from(n).ok()
}

/// Runs the full validation pipeline against `catalog`.
///
/// Catalog failures surface as `E` through `From<C::Error>`; rejections
/// surface through `From<IngredientLineError>`.
pub fn validate_lines<C, E>(raw: &[Value], catalog: &mut C) -> Result<ValidatedLines, E>
where
    C: IngredientCatalog,
    E: From<IngredientLineError> + From<C::Error>,
{
    let lines = parse_lines(raw)?;

    let requested: BTreeSet<i32> = lines.iter().map(|l| l.ingredient_id).collect();
    let found = catalog.existing_ids(&requested)?;
    let missing: BTreeSet<i32> = requested.difference(&found).copied().collect();
    if !missing.is_empty() {
        return Err(
            IngredientLineError::InvalidIngredientReference(BadReference::Unknown(missing)).into(),
        );
    }

    if requested.len() != lines.len() {
        return Err(IngredientLineError::DuplicateIngredient {
            ids: duplicated_ids(&lines),
        }
        .into());
    }

    tracing::debug!(lines = lines.len(), "ingredient lines validated");
    Ok(ValidatedLines(lines))
}

fn duplicated_ids(lines: &[IngredientLine]) -> BTreeSet<i32> {
    let mut seen = BTreeSet::new();
    lines
        .iter()
        .filter(|line| !seen.insert(line.ingredient_id))
        .map(|line| line.ingredient_id)
        .collect()
}

/// Catalog backed by a fixed id set. Handy for tests and dry runs.
impl IngredientCatalog for BTreeSet<i32> {
    type Error = std::convert::Infallible;

    fn existing_ids(&mut self, ids: &BTreeSet<i32>) -> Result<BTreeSet<i32>, Self::Error> {
        Ok(ids.intersection(self).copied().collect())
    }
}
