use crate::api::{ApiError, ErrorResponse};
use crate::auth::{bearer_token, delete_session, AuthUser};
use crate::db::DbPool;
use crate::get_conn;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/auth/token/logout",
    tag = "auth",
    responses(
        (status = 204, description = "Session ended"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn logout(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    // The extractor already accepted this header.
    let token = bearer_token(&headers).map_err(|_| ApiError::Internal("Token disappeared"))?;

    let mut conn = get_conn!(pool);
    delete_session(&mut conn, token)?;

    tracing::info!(user_id = %user.id, "session ended");
    Ok(StatusCode::NO_CONTENT)
}
