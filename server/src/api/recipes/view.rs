//! Response shapes for recipes and the batch loader that fills them.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::users::view::UserResponse;
use crate::config::Config;
use crate::marks::{marked_among, MarkKind};
use crate::models::{Recipe, User};
use crate::schema::{ingredients, recipe_ingredients, users};
use crate::subscriptions::subscribed_among;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeIngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub published_at: DateTime<Utc>,
}

/// Compact form used in favorite/cart responses and subscription listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeShortResponse {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl RecipeShortResponse {
    pub fn new(config: &Config, recipe: &Recipe) -> Self {
        RecipeShortResponse {
            id: recipe.id,
            name: recipe.name.clone(),
            image: config.photo_url(recipe.image_photo_id),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Builds full responses for `recipes` with a fixed number of queries,
/// whatever the number of recipes.
pub fn build_recipes(
    conn: &mut PgConnection,
    config: &Config,
    viewer: Option<Uuid>,
    recipes: Vec<Recipe>,
) -> QueryResult<Vec<RecipeResponse>> {
    if recipes.is_empty() {
        return Ok(Vec::new());
    }

    let recipe_ids: Vec<Uuid> = recipes.iter().map(|r| r.id).collect();
    let author_ids: Vec<Uuid> = recipes
        .iter()
        .map(|r| r.author_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let authors: HashMap<Uuid, User> = users::table
        .filter(users::id.eq_any(&author_ids))
        .select(User::as_select())
        .load(conn)?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let line_rows: Vec<(Uuid, i32, String, String, i32)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(&recipe_ids))
        .order((recipe_ingredients::recipe_id, ingredients::name, ingredients::id))
        .select((
            recipe_ingredients::recipe_id,
            ingredients::id,
            ingredients::name,
            ingredients::measurement_unit,
            recipe_ingredients::amount,
        ))
        .load(conn)?;
    let mut lines: HashMap<Uuid, Vec<RecipeIngredientResponse>> = HashMap::new();
    for (recipe_id, id, name, measurement_unit, amount) in line_rows {
        lines.entry(recipe_id).or_default().push(RecipeIngredientResponse {
            id,
            name,
            measurement_unit,
            amount,
        });
    }

    let (favorited, in_cart, subscribed) = match viewer {
        Some(viewer) => (
            marked_among(conn, MarkKind::Favorite, viewer, &recipe_ids)?,
            marked_among(conn, MarkKind::Cart, viewer, &recipe_ids)?,
            subscribed_among(conn, viewer, &author_ids)?,
        ),
        None => Default::default(),
    };

    let mut responses = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        // recipes.author_id is a foreign key, so the author row exists.
        let Some(author) = authors.get(&recipe.author_id) else {
            return Err(diesel::result::Error::NotFound);
        };
        responses.push(RecipeResponse {
            id: recipe.id,
            author: UserResponse::new(config, author, subscribed.contains(&author.id)),
            ingredients: lines.remove(&recipe.id).unwrap_or_default(),
            is_favorited: favorited.contains(&recipe.id),
            is_in_shopping_cart: in_cart.contains(&recipe.id),
            image: config.photo_url(recipe.image_photo_id),
            name: recipe.name,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
            published_at: recipe.published_at,
        });
    }
    Ok(responses)
}

pub fn build_recipe(
    conn: &mut PgConnection,
    config: &Config,
    viewer: Option<Uuid>,
    recipe: Recipe,
) -> QueryResult<RecipeResponse> {
    build_recipes(conn, config, viewer, vec![recipe])?
        .pop()
        .ok_or(diesel::result::Error::NotFound)
}
