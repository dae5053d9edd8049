pub mod auth;
mod error;
mod extract;
#[cfg(test)]
mod flow_tests;
pub mod ingredients;
pub mod photos;
pub mod public;
pub mod recipes;
pub mod users;

pub use error::ApiError;
pub use extract::ApiJson;

use serde::Serialize;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{OpenApi, ToSchema};

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error class, e.g. `DuplicateIngredient`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(
        info(title = "larder", description = "Recipe sharing API"),
        components(schemas(ErrorResponse))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    if let Some(components) = spec.components.as_mut() {
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }

    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        public::ApiDoc::openapi(),
        auth::ApiDoc::openapi(),
        ingredients::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
        users::ApiDoc::openapi(),
        photos::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let spec = openapi();
        for path in [
            "/api/recipes",
            "/api/recipes/{id}",
            "/api/recipes/{id}/favorite",
            "/api/recipes/{id}/shopping_cart",
            "/api/recipes/download_shopping_cart",
            "/api/recipes/{id}/get-link",
            "/api/ingredients",
            "/api/ingredients/{id}",
            "/api/users",
            "/api/users/me",
            "/api/users/{id}",
            "/api/users/{id}/subscribe",
            "/api/users/subscriptions",
            "/api/auth/token/login",
            "/api/auth/token/logout",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }

        let users = &spec.paths.paths["/api/users"];
        assert!(users.get.is_some() && users.post.is_some());
    }
}
