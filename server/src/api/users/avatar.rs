use crate::api::{ApiError, ApiJson, ErrorResponse};
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::get_conn;
use crate::photos;
use crate::schema::users;
use axum::{extract::State, http::StatusCode, Json};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AvatarRequest {
    /// `data:image/<format>;base64,<payload>`
    pub avatar: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvatarResponse {
    pub avatar: String,
}

#[utoipa::path(
    put,
    path = "/api/users/me/avatar",
    tag = "users",
    request_body = AvatarRequest,
    responses(
        (status = 200, description = "Avatar replaced", body = AvatarResponse),
        (status = 400, description = "Invalid image", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn set_avatar(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    ApiJson(req): ApiJson<AvatarRequest>,
) -> Result<Json<AvatarResponse>, ApiError> {
    let mut conn = get_conn!(pool);

    let photo_id = conn.transaction::<_, ApiError, _>(|conn| {
        let photo_id = photos::store_data_url(conn, user.id, &req.avatar)?;
        diesel::update(users::table.filter(users::id.eq(user.id)))
            .set(users::avatar_photo_id.eq(Some(photo_id)))
            .execute(conn)?;
        if let Some(old) = user.avatar_photo_id {
            photos::delete(conn, old)?;
        }
        Ok(photo_id)
    })?;

    tracing::info!(user_id = %user.id, %photo_id, "avatar set");
    Ok(Json(AvatarResponse {
        avatar: config.photo_url(photo_id),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/users/me/avatar",
    tag = "users",
    responses(
        (status = 204, description = "Avatar removed"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "No avatar set", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_avatar(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> Result<StatusCode, ApiError> {
    let Some(photo_id) = user.avatar_photo_id else {
        return Err(ApiError::NotFound("No avatar set"));
    };

    let mut conn = get_conn!(pool);
    conn.transaction::<_, ApiError, _>(|conn| {
        diesel::update(users::table.filter(users::id.eq(user.id)))
            .set(users::avatar_photo_id.eq(None::<Uuid>))
            .execute(conn)?;
        photos::delete(conn, photo_id)?;
        Ok(())
    })?;

    tracing::info!(user_id = %user.id, "avatar removed");
    Ok(StatusCode::NO_CONTENT)
}
