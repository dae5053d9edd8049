use super::view::{build_recipes, RecipeResponse};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::MaybeUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Recipe;
use crate::schema::{cart_items, favorites, recipes};
use axum::{
    extract::{Query, State},
    Json,
};
use diesel::dsl::not;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListRecipesParams {
    /// Only recipes by this author
    pub author: Option<String>,
    /// `1` for favorites only, `0` to exclude them. Ignored for anonymous callers.
    pub is_favorited: Option<String>,
    /// `1` for cart recipes only, `0` to exclude them. Ignored for anonymous callers.
    pub is_in_shopping_cart: Option<String>,
}

/// Reads a `0`/`1` query flag. Any other value means "no filter".
fn flag(raw: Option<&str>) -> Option<bool> {
    match raw.map(str::trim) {
        Some("1") => Some(true),
        Some("0") => Some(false),
        _ => None,
    }
}

fn author_filter(raw: Option<&str>) -> Result<Option<Uuid>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => Uuid::parse_str(s)
            .map(Some)
            .map_err(|_| ApiError::Validation(format!("Invalid author id: {s}"))),
    }
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "Recipes, newest first", body = Vec<RecipeResponse>),
        (status = 400, description = "Invalid filter", body = ErrorResponse)
    )
)]
pub async fn list_recipes(
    MaybeUser(viewer): MaybeUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    Query(params): Query<ListRecipesParams>,
) -> Result<Json<Vec<RecipeResponse>>, ApiError> {
    let author = author_filter(params.author.as_deref())?;
    let viewer_id = viewer.map(|u| u.id);

    let mut conn = get_conn!(pool);

    let mut query = recipes::table
        .select(Recipe::as_select())
        .order((recipes::published_at.desc(), recipes::id))
        .into_boxed();

    if let Some(author) = author {
        query = query.filter(recipes::author_id.eq(author));
    }

    if let Some(viewer_id) = viewer_id {
        let favorite_ids = favorites::table
            .filter(favorites::user_id.eq(viewer_id))
            .select(favorites::recipe_id);
        query = match flag(params.is_favorited.as_deref()) {
            Some(true) => query.filter(recipes::id.eq_any(favorite_ids)),
            Some(false) => query.filter(not(recipes::id.eq_any(favorite_ids))),
            None => query,
        };

        let cart_ids = cart_items::table
            .filter(cart_items::user_id.eq(viewer_id))
            .select(cart_items::recipe_id);
        query = match flag(params.is_in_shopping_cart.as_deref()) {
            Some(true) => query.filter(recipes::id.eq_any(cart_ids)),
            Some(false) => query.filter(not(recipes::id.eq_any(cart_ids))),
            None => query,
        };
    }

    let found = query.load(&mut conn)?;
    let response = build_recipes(&mut conn, &config, viewer_id, found)?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_values() {
        assert_eq!(flag(Some("1")), Some(true));
        assert_eq!(flag(Some("0")), Some(false));
        assert_eq!(flag(Some("true")), None);
        assert_eq!(flag(Some("")), None);
        assert_eq!(flag(None), None);
    }

    #[test]
    fn test_author_filter() {
        assert_eq!(author_filter(None).unwrap(), None);
        assert_eq!(author_filter(Some("")).unwrap(), None);
        let id = Uuid::new_v4();
        assert_eq!(author_filter(Some(&id.to_string())).unwrap(), Some(id));
        assert!(author_filter(Some("42")).is_err());
    }
}
