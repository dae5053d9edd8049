use crate::AppState;
use axum::{
    extract::Path,
    response::{IntoResponse, Redirect},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

/// Returns the router for public endpoints (no auth required)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/test/unauthed-ping", get(unauthed_ping))
        .route("/s/{id}", get(short_link))
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UnauthedPingResponse {
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/api/test/unauthed-ping",
    tag = "testing",
    responses(
        (status = 200, description = "Unauthenticated ping response", body = UnauthedPingResponse)
    )
)]
pub async fn unauthed_ping() -> impl IntoResponse {
    Json(UnauthedPingResponse {
        message: "unauthed-ping".to_string(),
    })
}

/// Expands a short link handed out by `get-link`.
#[utoipa::path(
    get,
    path = "/s/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 308, description = "Redirect to the recipe")
    )
)]
pub async fn short_link(Path(id): Path<Uuid>) -> Redirect {
    Redirect::permanent(&format!("/api/recipes/{id}"))
}

#[derive(OpenApi)]
#[openapi(
    paths(unauthed_ping, short_link),
    components(schemas(UnauthedPingResponse))
)]
pub struct ApiDoc;
