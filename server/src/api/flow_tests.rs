//! End-to-end request flows through the full router.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use crate::test_support::{create_ingredient, offline_state, test_state};

// 1x1 palette PNG.
const TINY_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABAgMAAABieywaAAAACVBMVEUAAAD///9fX1/S0ecCAAAACXBIWXMAAA7EAAAOxAGVKw4bAAAACklEQVQImWNoAAAAggCByxOyYQAAAABJRU5ErkJggg==";

struct Reply {
    status: StatusCode,
    headers: axum::http::HeaderMap,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    fn text(&self) -> String {
        String::from_utf8(self.body.clone()).unwrap()
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Reply {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Token {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();
    Reply {
        status,
        headers,
        body,
    }
}

async fn register(app: &Router, name: &str) -> (Uuid, String) {
    let email = format!("{}-{}@example.com", name, Uuid::new_v4().simple());
    let created = send(
        app,
        "POST",
        "/api/users",
        None,
        Some(json!({
            "email": email,
            "username": format!("{}-{}", name, &Uuid::new_v4().simple().to_string()[..8]),
            "first_name": name,
            "last_name": "Tester",
            "password": "correct-horse"
        })),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.text());
    let id: Uuid = created.json()["id"].as_str().unwrap().parse().unwrap();

    let login = send(
        app,
        "POST",
        "/api/auth/token/login",
        None,
        Some(json!({"email": email, "password": "correct-horse"})),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);
    (id, login.json()["auth_token"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn test_routes_that_need_no_database() {
    let app = crate::app(offline_state());

    let ping = send(&app, "GET", "/api/test/unauthed-ping", None, None).await;
    assert_eq!(ping.status, StatusCode::OK);

    let me = send(&app, "GET", "/api/users/me", None, None).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);

    // A token that cannot be checked is a server fault, not a bad token.
    let unreachable = send(&app, "GET", "/api/users/me", Some("abc"), None).await;
    assert_eq!(unreachable.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(unreachable.json()["code"], "InternalError");

    let id = Uuid::new_v4();
    let short = send(&app, "GET", &format!("/s/{id}"), None, None).await;
    assert_eq!(short.status, StatusCode::PERMANENT_REDIRECT);
    assert_eq!(
        short.headers[header::LOCATION],
        format!("/api/recipes/{id}").as_str()
    );

    let spec = send(&app, "GET", "/api-docs/openapi.json", None, None).await;
    assert_eq!(spec.status, StatusCode::OK);
}

#[tokio::test]
async fn test_recipe_cart_and_subscription_flow() {
    let Some(state) = test_state() else { return };
    let app = crate::app(state.clone());

    let (flour, egg) = {
        let mut conn = state.pool.get().unwrap();
        (
            create_ingredient(&mut conn, "flour", "g"),
            create_ingredient(&mut conn, "egg", "pcs"),
        )
    };

    let (author, author_token) = register(&app, "author").await;
    let (_, reader_token) = register(&app, "reader").await;

    let recipe = |lines: Value| {
        json!({
            "ingredients": lines,
            "image": TINY_PNG,
            "name": "Pancakes",
            "text": "Whisk and fry.",
            "cooking_time": 15
        })
    };

    let first = send(
        &app,
        "POST",
        "/api/recipes",
        Some(&author_token),
        Some(recipe(json!([
            {"id": flour, "amount": 200},
            {"id": egg, "amount": 2}
        ]))),
    )
    .await;
    assert_eq!(first.status, StatusCode::CREATED, "{}", first.text());
    let first_id = first.json()["id"].as_str().unwrap().to_string();
    assert_eq!(first.json()["ingredients"].as_array().unwrap().len(), 2);

    let second = send(
        &app,
        "POST",
        "/api/recipes",
        Some(&author_token),
        Some(recipe(json!([{"id": flour, "amount": 50}]))),
    )
    .await;
    assert_eq!(second.status, StatusCode::CREATED);
    let second_id = second.json()["id"].as_str().unwrap().to_string();

    let duplicate = send(
        &app,
        "POST",
        "/api/recipes",
        Some(&author_token),
        Some(recipe(json!([
            {"id": flour, "amount": 1},
            {"id": flour, "amount": 2}
        ]))),
    )
    .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.json()["code"], "DuplicateIngredient");

    let unknown = send(
        &app,
        "POST",
        "/api/recipes",
        Some(&author_token),
        Some(recipe(json!([{"id": 999_999_999, "amount": 1}]))),
    )
    .await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown.json()["code"], "InvalidIngredientReference");

    let malformed = send(
        &app,
        "POST",
        "/api/recipes",
        Some(&author_token),
        Some(recipe(Value::Null)),
    )
    .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(malformed.json()["code"], "ValidationError");

    // Only the author may edit.
    let update_body = json!({"ingredients": [{"id": flour, "amount": 100}]});
    let forbidden = send(
        &app,
        "PATCH",
        &format!("/api/recipes/{first_id}"),
        Some(&reader_token),
        Some(update_body.clone()),
    )
    .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let updated = send(
        &app,
        "PATCH",
        &format!("/api/recipes/{first_id}"),
        Some(&author_token),
        Some(update_body),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK, "{}", updated.text());
    let lines = updated.json()["ingredients"].clone();
    assert_eq!(lines.as_array().unwrap().len(), 1);
    assert_eq!(lines[0]["amount"], 100);

    for id in [&first_id, &second_id] {
        let added = send(
            &app,
            "POST",
            &format!("/api/recipes/{id}/shopping_cart"),
            Some(&reader_token),
            None,
        )
        .await;
        assert_eq!(added.status, StatusCode::CREATED);
    }
    let again = send(
        &app,
        "POST",
        &format!("/api/recipes/{first_id}/shopping_cart"),
        Some(&reader_token),
        None,
    )
    .await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);

    let csv = send(
        &app,
        "GET",
        "/api/recipes/download_shopping_cart",
        Some(&reader_token),
        None,
    )
    .await;
    assert_eq!(csv.status, StatusCode::OK);
    assert!(csv.headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert_eq!(csv.text(), "Ingredient,Amount,Unit\r\nFlour,150,g\r\n");

    let in_cart = send(
        &app,
        "GET",
        "/api/recipes?is_in_shopping_cart=1",
        Some(&reader_token),
        None,
    )
    .await;
    assert_eq!(in_cart.json().as_array().unwrap().len(), 2);

    let subscribed = send(
        &app,
        "POST",
        &format!("/api/users/{author}/subscribe"),
        Some(&reader_token),
        None,
    )
    .await;
    assert_eq!(subscribed.status, StatusCode::CREATED);
    assert_eq!(subscribed.json()["recipes_count"], 2);
    assert_eq!(subscribed.json()["is_subscribed"], true);

    let author_entry = |listing: &Value| {
        listing
            .as_array()
            .unwrap()
            .iter()
            .find(|u| u["id"] == author.to_string())
            .cloned()
            .unwrap()
    };
    let as_reader = send(&app, "GET", "/api/users", Some(&reader_token), None).await;
    assert_eq!(as_reader.status, StatusCode::OK);
    assert_eq!(author_entry(&as_reader.json())["is_subscribed"], true);
    let anonymous = send(&app, "GET", "/api/users", None, None).await;
    assert_eq!(author_entry(&anonymous.json())["is_subscribed"], false);

    let twice = send(
        &app,
        "POST",
        &format!("/api/users/{author}/subscribe"),
        Some(&reader_token),
        None,
    )
    .await;
    assert_eq!(twice.status, StatusCode::BAD_REQUEST);
    assert_eq!(twice.json()["code"], "AlreadySubscribedError");

    let own = send(
        &app,
        "POST",
        &format!("/api/users/{author}/subscribe"),
        Some(&author_token),
        None,
    )
    .await;
    assert_eq!(own.status, StatusCode::BAD_REQUEST);
    assert_eq!(own.json()["code"], "SelfSubscriptionError");

    let listing = send(
        &app,
        "GET",
        "/api/users/subscriptions?recipes_limit=1",
        Some(&reader_token),
        None,
    )
    .await;
    let listing = listing.json();
    assert_eq!(listing[0]["recipes"].as_array().unwrap().len(), 1);
    assert_eq!(listing[0]["recipes_count"], 2);

    let logout = send(
        &app,
        "POST",
        "/api/auth/token/logout",
        Some(&reader_token),
        None,
    )
    .await;
    assert_eq!(logout.status, StatusCode::NO_CONTENT);
    let after = send(&app, "GET", "/api/users/me", Some(&reader_token), None).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
}
