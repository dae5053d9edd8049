use super::find_user;
use super::view::UserResponse;
use crate::api::recipes::view::RecipeShortResponse;
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{Recipe, User};
use crate::schema::recipes;
use crate::subscriptions;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use diesel::prelude::*;
use larder_core::RecipesLimit;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// A followed author with their recipes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub author: UserResponse,
    pub recipes: Vec<RecipeShortResponse>,
    /// The author's current number of recipes, regardless of `recipes_limit`.
    pub recipes_count: i64,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RecipesLimitParams {
    /// Maximum recipes embedded per author. Non-numeric values are ignored.
    pub recipes_limit: Option<String>,
}

fn build_subscriptions(
    conn: &mut PgConnection,
    config: &Config,
    authors: Vec<User>,
    limit: RecipesLimit,
) -> QueryResult<Vec<SubscriptionResponse>> {
    let author_ids: Vec<Uuid> = authors.iter().map(|a| a.id).collect();

    let all: Vec<Recipe> = recipes::table
        .filter(recipes::author_id.eq_any(&author_ids))
        .order((recipes::published_at.desc(), recipes::id))
        .select(Recipe::as_select())
        .load(conn)?;
    let mut by_author: HashMap<Uuid, Vec<Recipe>> = HashMap::new();
    for recipe in all {
        by_author.entry(recipe.author_id).or_default().push(recipe);
    }

    Ok(authors
        .into_iter()
        .map(|author| {
            let own = by_author.remove(&author.id).unwrap_or_default();
            let recipes_count = own.len() as i64;
            SubscriptionResponse {
                author: UserResponse::new(config, &author, true),
                recipes: limit
                    .apply(own)
                    .iter()
                    .map(|r| RecipeShortResponse::new(config, r))
                    .collect(),
                recipes_count,
            }
        })
        .collect())
}

#[utoipa::path(
    get,
    path = "/api/users/subscriptions",
    tag = "users",
    params(RecipesLimitParams),
    responses(
        (status = 200, description = "Followed authors", body = Vec<SubscriptionResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_subscriptions(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    Query(params): Query<RecipesLimitParams>,
) -> Result<Json<Vec<SubscriptionResponse>>, ApiError> {
    let limit = RecipesLimit::parse(params.recipes_limit.as_deref());
    let mut conn = get_conn!(pool);

    let authors = subscriptions::followed_authors(&mut conn, user.id)?;
    let response = build_subscriptions(&mut conn, &config, authors, limit)?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe",
    tag = "users",
    params(
        ("id" = Uuid, Path, description = "Author ID"),
        RecipesLimitParams
    ),
    responses(
        (status = 201, description = "Subscribed", body = SubscriptionResponse),
        (status = 400, description = "Self subscription or already subscribed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Author not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn subscribe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    Path(id): Path<Uuid>,
    Query(params): Query<RecipesLimitParams>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), ApiError> {
    let limit = RecipesLimit::parse(params.recipes_limit.as_deref());
    let mut conn = get_conn!(pool);

    subscriptions::subscribe(&mut conn, user.id, id)?;

    let author = find_user(&mut conn, id)?;
    let response = build_subscriptions(&mut conn, &config, vec![author], limit)?
        .pop()
        .ok_or(ApiError::Internal("Subscription vanished"))?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe",
    tag = "users",
    params(
        ("id" = Uuid, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 400, description = "Not subscribed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Author not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn unsubscribe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut conn = get_conn!(pool);
    subscriptions::unsubscribe(&mut conn, user.id, id)?;
    Ok(StatusCode::NO_CONTENT)
}
