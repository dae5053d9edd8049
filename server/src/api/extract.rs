use axum::extract::FromRequest;

use super::ApiError;

/// `axum::Json` whose rejections render as a 400 [`ApiError`] body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::recipes::create::CreateRecipeRequest;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn accept(ApiJson(_): ApiJson<CreateRecipeRequest>) -> StatusCode {
        StatusCode::NO_CONTENT
    }

    async fn post_body(body: &str) -> (StatusCode, Value) {
        let app = Router::new().route("/", post(accept));
        let request = Request::post("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_undeserializable_bodies_are_bad_requests() {
        for body in [
            r#"{"ingredients": null, "image": "x", "name": "n", "text": "t", "cooking_time": 5}"#,
            r#"{"ingredients": "abc", "image": "x", "name": "n", "text": "t", "cooking_time": 5}"#,
            r#"{"ingredients": [], "image": "x", "name": "n", "text": "t", "cooking_time": "5"}"#,
            "{not json",
        ] {
            let (status, json) = post_body(body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(json["code"], "ValidationError", "{body}");
        }
    }

    #[tokio::test]
    async fn test_well_formed_body_passes_through() {
        let (status, _) = post_body(
            r#"{"ingredients": [], "image": "x", "name": "n", "text": "t", "cooking_time": 5}"#,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
