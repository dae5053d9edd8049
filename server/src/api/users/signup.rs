use super::view::UserResponse;
use crate::api::{ApiError, ApiJson, ErrorResponse};
use crate::auth::{hash_password, password_problem};
use crate::config::Config;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{NewUser, User};
use crate::schema::users;
use axum::{extract::State, http::StatusCode, Json};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

const MAX_EMAIL_LENGTH: usize = 254;
const MAX_NAME_LENGTH: usize = 150;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

fn check_email(email: &str) -> Result<String, ApiError> {
    let email = email.trim().to_lowercase();
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.contains('@')
        }
        None => false,
    };
    if well_formed && email.chars().count() <= MAX_EMAIL_LENGTH {
        Ok(email)
    } else {
        Err(ApiError::Validation("Enter a valid email address".into()))
    }
}

fn check_username(username: &str) -> Result<&str, ApiError> {
    let username = username.trim();
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '.' | '@' | '+' | '-' | '_');
    if username.is_empty()
        || username.chars().count() > MAX_NAME_LENGTH
        || !username.chars().all(allowed)
    {
        return Err(ApiError::Validation(
            "Username may contain only letters, digits and @/./+/-/_".into(),
        ));
    }
    Ok(username)
}

fn check_person_name<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > MAX_NAME_LENGTH {
        return Err(ApiError::Validation(format!(
            "{field} must be between 1 and {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(value)
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body(content = SignupRequest, example = json!({
        "email": "cook@example.com",
        "username": "cook",
        "first_name": "Ada",
        "last_name": "Cook",
        "password": "s3cret-pass"
    })),
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email or username already taken", body = ErrorResponse)
    )
)]
pub async fn signup(
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let email = check_email(&req.email)?;
    let username = check_username(&req.username)?;
    let first_name = check_person_name("First name", &req.first_name)?;
    let last_name = check_person_name("Last name", &req.last_name)?;
    if let Some(problem) = password_problem(&req.password) {
        return Err(ApiError::Validation(problem.into()));
    }

    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::Internal("Failed to hash password")
    })?;

    let mut conn = get_conn!(pool);

    let user: User = diesel::insert_into(users::table)
        .values(&NewUser {
            email: &email,
            username,
            first_name,
            last_name,
            password_hash: &password_hash,
        })
        .returning(User::as_returning())
        .get_result(&mut conn)
        .map_err(|e| match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                ApiError::Conflict("A user with that email or username already exists")
            }
            other => ApiError::Database(other),
        })?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse::new(&config, &user, false)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_normalised() {
        assert_eq!(check_email(" Cook@Example.COM ").unwrap(), "cook@example.com");
        assert!(check_email("no-at-sign").is_err());
        assert!(check_email("@example.com").is_err());
        assert!(check_email("a@localhost").is_err());
    }

    #[test]
    fn test_username_characters() {
        assert_eq!(check_username("chef.ada+1").unwrap(), "chef.ada+1");
        assert!(check_username("two words").is_err());
        assert!(check_username("").is_err());
    }

    #[test]
    fn test_person_name_length() {
        assert!(check_person_name("First name", "Ada").is_ok());
        assert!(check_person_name("First name", " ").is_err());
        assert!(check_person_name("First name", &"x".repeat(151)).is_err());
    }
}
