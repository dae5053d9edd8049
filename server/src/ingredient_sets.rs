//! Persistence side of a recipe's ingredient lines.
//!
//! [`replace_lines`] is the only code path that writes `recipe_ingredients`;
//! rows disappear otherwise only through the cascade on recipe deletion.

use std::collections::BTreeSet;

use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use larder_core::{validate_lines, IngredientCatalog, ValidatedLines};
use serde_json::Value;
use uuid::Uuid;

use crate::api::ApiError;
use crate::models::NewRecipeIngredient;
use crate::schema::{ingredients, recipe_ingredients};

/// The ingredient catalog as seen through a live connection.
pub struct PgCatalog<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> PgCatalog<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }
}

impl IngredientCatalog for PgCatalog<'_> {
    type Error = DieselError;

    fn existing_ids(&mut self, ids: &BTreeSet<i32>) -> Result<BTreeSet<i32>, Self::Error> {
        let ids: Vec<i32> = ids.iter().copied().collect();
        let found: Vec<i32> = ingredients::table
            .filter(ingredients::id.eq_any(&ids))
            .select(ingredients::id)
            .load(self.conn)?;
        Ok(found.into_iter().collect())
    }
}

/// Validates a submitted `ingredients` array against the catalog.
pub fn validate(conn: &mut PgConnection, raw: &[Value]) -> Result<ValidatedLines, ApiError> {
    validate_lines::<_, ApiError>(raw, &mut PgCatalog::new(conn))
}

/// Swaps the recipe's whole ingredient set for `lines`.
///
/// Runs in its own savepoint, so a failure leaves the previous set in place
/// whether or not the caller already holds a transaction.
pub fn replace_lines(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    lines: &ValidatedLines,
) -> Result<usize, ApiError> {
    let rows: Vec<NewRecipeIngredient> = lines
        .lines()
        .iter()
        .map(|line| NewRecipeIngredient {
            recipe_id,
            ingredient_id: line.ingredient_id,
            amount: line.amount,
        })
        .collect();

    conn.transaction::<_, ApiError, _>(|conn| {
        let removed = diesel::delete(
            recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)),
        )
        .execute(conn)?;

        let inserted = diesel::insert_into(recipe_ingredients::table)
            .values(&rows)
            .execute(conn)
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                    ApiError::ReferentialIntegrityViolation
                }
                other => ApiError::Database(other),
            })?;

        tracing::debug!(%recipe_id, removed, inserted, "replaced ingredient lines");
        Ok(inserted)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_ingredient, create_recipe, create_user, test_conn};
    use serde_json::json;

    fn lines_of(conn: &mut PgConnection, recipe_id: Uuid) -> Vec<(i32, i32)> {
        recipe_ingredients::table
            .filter(recipe_ingredients::recipe_id.eq(recipe_id))
            .select((recipe_ingredients::ingredient_id, recipe_ingredients::amount))
            .order(recipe_ingredients::ingredient_id)
            .load(conn)
            .unwrap()
    }

    #[test]
    fn test_catalog_reports_only_existing_ids() {
        let Some(mut conn) = test_conn() else { return };
        let flour = create_ingredient(&mut conn, "flour", "g");
        let found = PgCatalog::new(&mut conn)
            .existing_ids(&BTreeSet::from([flour, -1]))
            .unwrap();
        assert_eq!(found, BTreeSet::from([flour]));
    }

    #[test]
    fn test_update_replaces_whole_set() {
        let Some(mut conn) = test_conn() else { return };
        let flour = create_ingredient(&mut conn, "flour", "g");
        let egg = create_ingredient(&mut conn, "egg", "pcs");
        let author = create_user(&mut conn, "cook");
        let recipe = create_recipe(&mut conn, author);

        let first = validate(
            &mut conn,
            &[json!({"id": flour, "amount": 100}), json!({"id": egg, "amount": 5})],
        )
        .unwrap();
        replace_lines(&mut conn, recipe, &first).unwrap();
        assert_eq!(lines_of(&mut conn, recipe), vec![(flour, 100), (egg, 5)]);

        let second = validate(&mut conn, &[json!({"id": flour, "amount": 50})]).unwrap();
        replace_lines(&mut conn, recipe, &second).unwrap();
        assert_eq!(lines_of(&mut conn, recipe), vec![(flour, 50)]);
    }

    #[test]
    fn test_vanished_ingredient_keeps_previous_set() {
        let Some(mut conn) = test_conn() else { return };
        let flour = create_ingredient(&mut conn, "flour", "g");
        let salt = create_ingredient(&mut conn, "salt", "g");
        let author = create_user(&mut conn, "cook");
        let recipe = create_recipe(&mut conn, author);

        let original = validate(&mut conn, &[json!({"id": flour, "amount": 200})]).unwrap();
        replace_lines(&mut conn, recipe, &original).unwrap();

        let replacement = validate(
            &mut conn,
            &[json!({"id": flour, "amount": 10}), json!({"id": salt, "amount": 1})],
        )
        .unwrap();
        diesel::delete(ingredients::table.filter(ingredients::id.eq(salt)))
            .execute(&mut conn)
            .unwrap();

        let err = replace_lines(&mut conn, recipe, &replacement).unwrap_err();
        assert!(matches!(err, ApiError::ReferentialIntegrityViolation));
        assert_eq!(lines_of(&mut conn, recipe), vec![(flour, 200)]);
    }

    #[test]
    fn test_validation_names_missing_ids() {
        let Some(mut conn) = test_conn() else { return };
        let flour = create_ingredient(&mut conn, "flour", "g");
        let err = validate(
            &mut conn,
            &[json!({"id": flour, "amount": 1}), json!({"id": 999_999, "amount": 1})],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Unknown ingredient ids: 999999");
    }
}
