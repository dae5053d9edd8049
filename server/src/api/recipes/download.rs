use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::cart::cart_totals;
use crate::db::DbPool;
use crate::get_conn;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use larder_core::render_csv;
use std::sync::Arc;

pub const CSV_FILENAME: &str = "shopping_list.csv";

#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart",
    tag = "recipes",
    responses(
        (status = 200, description = "Aggregated shopping list", content_type = "text/csv", body = String),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn download_shopping_cart(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> Result<Response, ApiError> {
    let mut conn = get_conn!(pool);

    let totals = cart_totals(&mut conn, user.id)?;
    tracing::info!(user_id = %user.id, ingredients = totals.len(), "shopping cart exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{CSV_FILENAME}\""),
            ),
        ],
        render_csv(&totals),
    )
        .into_response())
}
