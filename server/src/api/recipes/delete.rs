use super::find_recipe;
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::photos;
use crate::schema::recipes;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Recipe deleted successfully"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut conn = get_conn!(pool);

    conn.transaction::<_, ApiError, _>(|conn| {
        let recipe = find_recipe(conn, id)?;
        if recipe.author_id != user.id {
            return Err(ApiError::Forbidden(
                "You do not have permission to delete this recipe",
            ));
        }

        // Lines, favorites and cart entries go with the recipe row.
        diesel::delete(recipes::table.filter(recipes::id.eq(id))).execute(conn)?;
        photos::delete(conn, recipe.image_photo_id)?;
        Ok(())
    })?;

    tracing::info!(recipe_id = %id, user_id = %user.id, "recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}
