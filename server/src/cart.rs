//! Loads a user's cart from the database and hands it to the core aggregator.

use diesel::connection::{AnsiTransactionManager, TransactionManager};
use diesel::prelude::*;
use larder_core::{aggregate, CartLine, CartTotal};
use uuid::Uuid;

use crate::schema::{cart_items, ingredients, recipe_ingredients};

/// Summed ingredient amounts over every recipe in the user's cart.
///
/// Cart membership and ingredient lines are read from one snapshot. When the
/// caller already holds a transaction its snapshot is used instead.
pub fn cart_totals(conn: &mut PgConnection, user_id: Uuid) -> QueryResult<Vec<CartTotal>> {
    let nested = AnsiTransactionManager::transaction_manager_status_mut(conn)
        .transaction_depth()?
        .is_some();

    if nested {
        conn.transaction(|conn| load_totals(conn, user_id))
    } else {
        conn.build_transaction()
            .read_only()
            .repeatable_read()
            .run(|conn| load_totals(conn, user_id))
    }
}

fn load_totals(conn: &mut PgConnection, user_id: Uuid) -> QueryResult<Vec<CartTotal>> {
    let in_cart = cart_items::table
        .filter(cart_items::user_id.eq(user_id))
        .select(cart_items::recipe_id);

    let rows: Vec<(i32, String, String, i32)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(in_cart))
        .select((
            ingredients::id,
            ingredients::name,
            ingredients::measurement_unit,
            recipe_ingredients::amount,
        ))
        .load(conn)?;

    tracing::debug!(%user_id, lines = rows.len(), "loaded cart lines");

    Ok(aggregate(rows.into_iter().map(
        |(ingredient_id, name, measurement_unit, amount)| CartLine {
            ingredient_id,
            name,
            measurement_unit,
            amount,
        },
    )))
}
