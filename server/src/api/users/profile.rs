use super::find_user;
use super::view::UserResponse;
use crate::api::{ApiError, ErrorResponse};
use crate::auth::{AuthUser, MaybeUser};
use crate::config::Config;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::User;
use crate::schema::users;
use crate::subscriptions::subscribed_among;
use axum::{
    extract::{Path, State},
    Json,
};
use diesel::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 200, description = "The caller's profile", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(
    AuthUser(user): AuthUser,
    State(config): State<Arc<Config>>,
) -> Json<UserResponse> {
    Json(UserResponse::new(&config, &user, false))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Public profile", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn get_user(
    MaybeUser(viewer): MaybeUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let mut conn = get_conn!(pool);

    let user = find_user(&mut conn, id)?;
    let is_subscribed = match viewer {
        Some(viewer) => subscribed_among(&mut conn, viewer.id, &[user.id])?.contains(&user.id),
        None => false,
    };

    Ok(Json(UserResponse::new(&config, &user, is_subscribed)))
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    responses(
        (status = 200, description = "All users, ordered by username", body = Vec<UserResponse>)
    )
)]
pub async fn list_users(
    MaybeUser(viewer): MaybeUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let mut conn = get_conn!(pool);

    let all: Vec<User> = users::table
        .order((users::username, users::id))
        .select(User::as_select())
        .load(&mut conn)?;

    let followed = match viewer {
        Some(viewer) => {
            let ids: Vec<Uuid> = all.iter().map(|u| u.id).collect();
            subscribed_among(&mut conn, viewer.id, &ids)?
        }
        None => HashSet::new(),
    };

    Ok(Json(
        all.iter()
            .map(|u| UserResponse::new(&config, u, followed.contains(&u.id)))
            .collect(),
    ))
}
