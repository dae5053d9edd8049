use super::view::{build_recipe, RecipeResponse};
use super::{check_cooking_time, check_name, check_text, IngredientAmount};
use crate::api::{ApiError, ApiJson, ErrorResponse};
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::get_conn;
use crate::ingredient_sets;
use crate::models::{NewRecipe, Recipe};
use crate::photos;
use crate::schema::recipes;
use axum::{extract::State, http::StatusCode, Json};
use diesel::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    #[serde(default)]
    #[schema(value_type = Vec<IngredientAmount>)]
    pub ingredients: Vec<Value>,
    /// `data:image/<format>;base64,<payload>`
    pub image: String,
    pub name: String,
    pub text: String,
    /// Minutes, at least 1.
    pub cooking_time: i64,
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Invalid recipe or ingredient list", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 409, description = "An ingredient was removed concurrently", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    ApiJson(req): ApiJson<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<RecipeResponse>), ApiError> {
    let name = check_name(&req.name)?;
    let text = check_text(&req.text)?;
    let cooking_time = check_cooking_time(req.cooking_time)?;

    let mut conn = get_conn!(pool);

    let recipe = conn.transaction::<_, ApiError, _>(|conn| {
        let lines = ingredient_sets::validate(conn, &req.ingredients)?;
        let image_photo_id = photos::store_data_url(conn, user.id, &req.image)?;

        let recipe: Recipe = diesel::insert_into(recipes::table)
            .values(&NewRecipe {
                author_id: user.id,
                name,
                image_photo_id,
                text,
                cooking_time,
            })
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        ingredient_sets::replace_lines(conn, recipe.id, &lines)?;
        Ok(recipe)
    })?;

    tracing::info!(recipe_id = %recipe.id, user_id = %user.id, "recipe created");

    let response = build_recipe(&mut conn, &config, Some(user.id), recipe)?;
    Ok((StatusCode::CREATED, Json(response)))
}
