//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::account::{CreateUserRequest, Todo, TodoRequest, UpdateUserRequest, User};
use crate::error::ErrorBody;
use crate::user_auth::{LoginRequest, LoginResponse};

/// RS256 bearer token obtained from `POST /api/v1/login`
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_jwt",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Authorization: Bearer <token>. Tokens are RS256-signed and expire 15 minutes after issuance.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "todose API",
        version = "0.1.0",
        description = "Todo records behind RS256 bearer-token authentication.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::user_auth::handlers::login,
        crate::gateway::handlers::users::get_users,
        crate::gateway::handlers::users::get_user,
        crate::gateway::handlers::users::create_user,
        crate::gateway::handlers::users::update_user,
        crate::gateway::handlers::users::delete_user,
        crate::gateway::handlers::todos::get_todos,
        crate::gateway::handlers::todos::get_todo,
        crate::gateway::handlers::todos::create_todo,
        crate::gateway::handlers::todos::update_todo,
        crate::gateway::handlers::todos::delete_todo,
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            ErrorBody,
            User,
            CreateUserRequest,
            UpdateUserRequest,
            Todo,
            TodoRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "System", description = "Health"),
        (name = "Auth", description = "Login and token issuance"),
        (name = "Users", description = "User records"),
        (name = "Todos", description = "Todo records")
    )
)]
pub struct ApiDoc;
