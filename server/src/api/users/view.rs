use crate::config::Config;
use crate::models::User;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub email: String,
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the caller follows this user. Always false for anonymous callers.
    pub is_subscribed: bool,
    /// Absolute URL of the avatar image.
    pub avatar: Option<String>,
}

impl UserResponse {
    pub fn new(config: &Config, user: &User, is_subscribed: bool) -> Self {
        UserResponse {
            email: user.email.clone(),
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
            avatar: user.avatar_photo_id.map(|id| config.photo_url(id)),
        }
    }
}
