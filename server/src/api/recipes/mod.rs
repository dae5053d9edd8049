pub mod create;
pub mod delete;
pub mod download;
pub mod get;
pub mod link;
pub mod list;
pub mod marks;
pub mod update;
pub mod view;

use crate::api::ApiError;
use crate::models::Recipe;
use crate::schema::recipes;
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use diesel::prelude::*;
use serde::Deserialize;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route(
            "/download_shopping_cart",
            get(download::download_shopping_cart),
        )
        .route(
            "/{id}",
            get(get::get_recipe)
                .patch(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route("/{id}/get-link", get(link::get_link))
        .route(
            "/{id}/favorite",
            post(marks::add_favorite).delete(marks::remove_favorite),
        )
        .route(
            "/{id}/shopping_cart",
            post(marks::add_to_cart).delete(marks::remove_from_cart),
        )
}

/// One `{id, amount}` entry of a recipe's `ingredients` list.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IngredientAmount {
    pub id: i32,
    pub amount: i32,
}

pub const MAX_NAME_LENGTH: usize = 256;

pub(crate) fn find_recipe(conn: &mut PgConnection, id: Uuid) -> Result<Recipe, ApiError> {
    recipes::table
        .filter(recipes::id.eq(id))
        .select(Recipe::as_select())
        .first(conn)
        .optional()?
        .ok_or(ApiError::NotFound("Recipe not found"))
}

pub(crate) fn check_name(name: &str) -> Result<&str, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Recipe name must not be empty".into()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ApiError::Validation(format!(
            "Recipe name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name)
}

pub(crate) fn check_text(text: &str) -> Result<&str, ApiError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ApiError::Validation("Recipe text must not be empty".into()));
    }
    Ok(text)
}

pub(crate) fn check_cooking_time(minutes: i64) -> Result<i32, ApiError> {
    match i32::try_from(minutes) {
        Ok(m) if m >= 1 => Ok(m),
        _ => Err(ApiError::Validation(
            "Cooking time must be a positive number of minutes".into(),
        )),
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_recipe,
        list::list_recipes,
        get::get_recipe,
        update::update_recipe,
        delete::delete_recipe,
        link::get_link,
        marks::add_favorite,
        marks::remove_favorite,
        marks::add_to_cart,
        marks::remove_from_cart,
        download::download_shopping_cart,
    ),
    components(schemas(
        IngredientAmount,
        create::CreateRecipeRequest,
        update::UpdateRecipeRequest,
        link::ShortLinkResponse,
        view::RecipeResponse,
        view::RecipeShortResponse,
        view::RecipeIngredientResponse,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_trimmed_and_bounded() {
        assert_eq!(check_name("  Pancakes ").unwrap(), "Pancakes");
        assert!(check_name("   ").is_err());
        assert!(check_name(&"x".repeat(MAX_NAME_LENGTH)).is_ok());
        assert!(check_name(&"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_cooking_time_bounds() {
        assert_eq!(check_cooking_time(1).unwrap(), 1);
        assert!(check_cooking_time(0).is_err());
        assert!(check_cooking_time(-5).is_err());
        assert!(check_cooking_time(i64::from(i32::MAX) + 1).is_err());
    }
}
