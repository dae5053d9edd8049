pub mod avatar;
pub mod profile;
pub mod set_password;
pub mod signup;
pub mod subscriptions;
pub mod view;

use crate::api::ApiError;
use crate::models::User;
use crate::schema::users;
use crate::AppState;
use axum::routing::{get, post, put};
use axum::Router;
use diesel::prelude::*;
use utoipa::OpenApi;
use uuid::Uuid;

/// Returns the router for /api/users endpoints (mounted at /api/users)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::list_users).post(signup::signup))
        .route("/me", get(profile::me))
        .route(
            "/me/avatar",
            put(avatar::set_avatar).delete(avatar::delete_avatar),
        )
        .route("/set_password", post(set_password::set_password))
        .route("/subscriptions", get(subscriptions::list_subscriptions))
        .route("/{id}", get(profile::get_user))
        .route(
            "/{id}/subscribe",
            post(subscriptions::subscribe).delete(subscriptions::unsubscribe),
        )
}

pub(crate) fn find_user(conn: &mut PgConnection, id: Uuid) -> Result<User, ApiError> {
    users::table
        .filter(users::id.eq(id))
        .select(User::as_select())
        .first(conn)
        .optional()?
        .ok_or(ApiError::NotFound("User not found"))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        signup::signup,
        profile::list_users,
        profile::me,
        profile::get_user,
        set_password::set_password,
        avatar::set_avatar,
        avatar::delete_avatar,
        subscriptions::list_subscriptions,
        subscriptions::subscribe,
        subscriptions::unsubscribe,
    ),
    components(schemas(
        view::UserResponse,
        signup::SignupRequest,
        set_password::SetPasswordRequest,
        avatar::AvatarRequest,
        avatar::AvatarResponse,
        subscriptions::SubscriptionResponse,
    ))
)]
pub struct ApiDoc;
