//! Favorite and shopping-cart marks: per-user sets of recipes.

use std::collections::HashSet;

use diesel::prelude::*;
use uuid::Uuid;

use crate::api::ApiError;
use crate::models::{NewCartItem, NewFavorite};
use crate::schema::{cart_items, favorites};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkKind {
    Favorite,
    Cart,
}

impl MarkKind {
    fn already_marked(self) -> ApiError {
        match self {
            MarkKind::Favorite => ApiError::AlreadyMarked("Recipe is already in favorites"),
            MarkKind::Cart => ApiError::AlreadyMarked("Recipe is already in the shopping cart"),
        }
    }

    fn not_marked(self) -> ApiError {
        match self {
            MarkKind::Favorite => ApiError::NotMarked("Recipe is not in favorites"),
            MarkKind::Cart => ApiError::NotMarked("Recipe is not in the shopping cart"),
        }
    }
}

/// Adds a mark. A second add of the same pair is rejected and changes nothing.
pub fn add(
    conn: &mut PgConnection,
    kind: MarkKind,
    user_id: Uuid,
    recipe_id: Uuid,
) -> Result<(), ApiError> {
    let inserted = match kind {
        MarkKind::Favorite => diesel::insert_into(favorites::table)
            .values(&NewFavorite { user_id, recipe_id })
            .on_conflict_do_nothing()
            .execute(conn)?,
        MarkKind::Cart => diesel::insert_into(cart_items::table)
            .values(&NewCartItem { user_id, recipe_id })
            .on_conflict_do_nothing()
            .execute(conn)?,
    };

    if inserted == 0 {
        return Err(kind.already_marked());
    }
    tracing::info!(?kind, %user_id, %recipe_id, "mark added");
    Ok(())
}

pub fn remove(
    conn: &mut PgConnection,
    kind: MarkKind,
    user_id: Uuid,
    recipe_id: Uuid,
) -> Result<(), ApiError> {
    let deleted = match kind {
        MarkKind::Favorite => diesel::delete(
            favorites::table
                .filter(favorites::user_id.eq(user_id))
                .filter(favorites::recipe_id.eq(recipe_id)),
        )
        .execute(conn)?,
        MarkKind::Cart => diesel::delete(
            cart_items::table
                .filter(cart_items::user_id.eq(user_id))
                .filter(cart_items::recipe_id.eq(recipe_id)),
        )
        .execute(conn)?,
    };

    if deleted == 0 {
        return Err(kind.not_marked());
    }
    tracing::info!(?kind, %user_id, %recipe_id, "mark removed");
    Ok(())
}

/// Which of `recipe_ids` the user has marked.
pub fn marked_among(
    conn: &mut PgConnection,
    kind: MarkKind,
    user_id: Uuid,
    recipe_ids: &[Uuid],
) -> QueryResult<HashSet<Uuid>> {
    let ids: Vec<Uuid> = match kind {
        MarkKind::Favorite => favorites::table
            .filter(favorites::user_id.eq(user_id))
            .filter(favorites::recipe_id.eq_any(recipe_ids))
            .select(favorites::recipe_id)
            .load(conn)?,
        MarkKind::Cart => cart_items::table
            .filter(cart_items::user_id.eq(user_id))
            .filter(cart_items::recipe_id.eq_any(recipe_ids))
            .select(cart_items::recipe_id)
            .load(conn)?,
    };
    Ok(ids.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_recipe, create_user, test_conn};

    #[test]
    fn test_duplicate_add_is_rejected() {
        let Some(mut conn) = test_conn() else { return };
        let user = create_user(&mut conn, "shopper");
        let recipe = create_recipe(&mut conn, user);

        add(&mut conn, MarkKind::Cart, user, recipe).unwrap();
        let err = add(&mut conn, MarkKind::Cart, user, recipe).unwrap_err();
        assert!(matches!(err, ApiError::AlreadyMarked(_)));

        let marked = marked_among(&mut conn, MarkKind::Cart, user, &[recipe]).unwrap();
        assert_eq!(marked, HashSet::from([recipe]));
    }

    #[test]
    fn test_kinds_are_independent() {
        let Some(mut conn) = test_conn() else { return };
        let user = create_user(&mut conn, "shopper");
        let recipe = create_recipe(&mut conn, user);

        add(&mut conn, MarkKind::Favorite, user, recipe).unwrap();
        assert!(marked_among(&mut conn, MarkKind::Cart, user, &[recipe])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_remove_missing_is_rejected() {
        let Some(mut conn) = test_conn() else { return };
        let user = create_user(&mut conn, "shopper");
        let recipe = create_recipe(&mut conn, user);

        let err = remove(&mut conn, MarkKind::Favorite, user, recipe).unwrap_err();
        assert!(matches!(err, ApiError::NotMarked(_)));

        add(&mut conn, MarkKind::Favorite, user, recipe).unwrap();
        remove(&mut conn, MarkKind::Favorite, user, recipe).unwrap();
        assert!(marked_among(&mut conn, MarkKind::Favorite, user, &[recipe])
            .unwrap()
            .is_empty());
    }
}
