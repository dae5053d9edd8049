use super::find_recipe;
use super::view::{build_recipe, RecipeResponse};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::MaybeUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::get_conn;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details", body = RecipeResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn get_recipe(
    MaybeUser(viewer): MaybeUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let mut conn = get_conn!(pool);

    let recipe = find_recipe(&mut conn, id)?;
    let response = build_recipe(&mut conn, &config, viewer.map(|u| u.id), recipe)?;
    Ok(Json(response))
}
