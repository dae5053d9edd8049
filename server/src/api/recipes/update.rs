use super::view::{build_recipe, RecipeResponse};
use super::{check_cooking_time, check_name, check_text, IngredientAmount};
use crate::api::{ApiError, ApiJson, ErrorResponse};
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::get_conn;
use crate::ingredient_sets;
use crate::models::{Recipe, RecipeChanges};
use crate::photos;
use crate::schema::recipes;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// The ingredient list is always replaced in full and therefore required;
/// every other field is optional.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRecipeRequest {
    #[serde(default)]
    #[schema(value_type = Vec<IngredientAmount>)]
    pub ingredients: Vec<Value>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
}

/// Loads the recipe with `FOR UPDATE`; concurrent writers to the same recipe
/// queue up here until the holder's transaction ends.
pub(crate) fn lock_recipe(conn: &mut PgConnection, id: Uuid) -> Result<Recipe, ApiError> {
    recipes::table
        .filter(recipes::id.eq(id))
        .select(Recipe::as_select())
        .for_update()
        .first(conn)
        .optional()?
        .ok_or(ApiError::NotFound("Recipe not found"))
}

#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Invalid recipe or ingredient list", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 409, description = "An ingredient was removed concurrently", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<UpdateRecipeRequest>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let mut conn = get_conn!(pool);

    let (recipe, replaced_photo) = conn.transaction::<_, ApiError, _>(|conn| {
        let current = lock_recipe(conn, id)?;

        if current.author_id != user.id {
            return Err(ApiError::Forbidden(
                "You do not have permission to edit this recipe",
            ));
        }

        let name = req.name.as_deref().map(check_name).transpose()?;
        let text = req.text.as_deref().map(check_text).transpose()?;
        let cooking_time = req.cooking_time.map(check_cooking_time).transpose()?;

        let lines = ingredient_sets::validate(conn, &req.ingredients)?;
        let image_photo_id = req
            .image
            .as_deref()
            .map(|data_url| photos::store_data_url(conn, user.id, data_url))
            .transpose()?;

        let recipe: Recipe = diesel::update(recipes::table.filter(recipes::id.eq(id)))
            .set(&RecipeChanges {
                name,
                image_photo_id,
                text,
                cooking_time,
                updated_at: Utc::now(),
            })
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        ingredient_sets::replace_lines(conn, id, &lines)?;

        let replaced_photo = image_photo_id.map(|_| current.image_photo_id);
        if let Some(old) = replaced_photo {
            photos::delete(conn, old)?;
        }

        Ok((recipe, replaced_photo))
    })?;

    tracing::info!(
        recipe_id = %id,
        user_id = %user.id,
        new_image = replaced_photo.is_some(),
        "recipe updated"
    );

    let response = build_recipe(&mut conn, &config, Some(user.id), recipe)?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingredient_sets::{replace_lines, validate};
    use crate::schema::{ingredients, recipe_ingredients, users};
    use crate::test_support::{committed_conn, create_ingredient, create_recipe, create_user};
    use serde_json::json;
    use std::sync::mpsc;
    use std::thread;
    use std::time::{Duration, Instant};

    fn write_lines(conn: &mut PgConnection, recipe: Uuid, ingredient: i32, amount: i32) {
        let lines = validate(conn, &[json!({"id": ingredient, "amount": amount})]).unwrap();
        replace_lines(conn, recipe, &lines).unwrap();
    }

    #[test]
    fn test_second_writer_waits_for_row_lock() {
        let Some(mut setup) = committed_conn() else { return };
        let name = format!("rye-{}", Uuid::new_v4().simple());
        let rye = create_ingredient(&mut setup, &name, "g");
        let author = create_user(&mut setup, "locker");
        let recipe = create_recipe(&mut setup, author);

        let (locked_tx, locked_rx) = mpsc::channel();
        let first = thread::spawn(move || {
            let mut conn = committed_conn().unwrap();
            conn.transaction::<_, ApiError, _>(|conn| {
                lock_recipe(conn, recipe)?;
                locked_tx.send(()).unwrap();
                write_lines(conn, recipe, rye, 1);
                thread::sleep(Duration::from_millis(300));
                Ok(())
            })
            .unwrap();
        });

        locked_rx.recv().unwrap();
        let mut second = committed_conn().unwrap();
        let started = Instant::now();
        second
            .transaction::<_, ApiError, _>(|conn| {
                lock_recipe(conn, recipe)?;
                write_lines(conn, recipe, rye, 2);
                Ok(())
            })
            .unwrap();
        let waited = started.elapsed();
        first.join().unwrap();

        let lines: Vec<(i32, i32)> = recipe_ingredients::table
            .filter(recipe_ingredients::recipe_id.eq(recipe))
            .select((recipe_ingredients::ingredient_id, recipe_ingredients::amount))
            .load(&mut setup)
            .unwrap();

        diesel::delete(users::table.filter(users::id.eq(author)))
            .execute(&mut setup)
            .unwrap();
        diesel::delete(ingredients::table.filter(ingredients::id.eq(rye)))
            .execute(&mut setup)
            .unwrap();

        assert!(waited >= Duration::from_millis(200), "waited {waited:?}");
        assert_eq!(lines, vec![(rye, 2)]);
    }
}
