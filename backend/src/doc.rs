//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: every handler under `/api` plus the health checks
//! - **Schemas**: request and response DTOs, page envelopes and the error
//!   payload wrappers from [`crate::inbound::http::schemas`]
//! - **Security**: the `Authorization: Token <key>` header scheme
//!
//! The document backs Swagger UI (debug builds) and is exported via
//! `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::health::HealthStatus;
use crate::inbound::http::recipes_dto::{
    IngredientAmountRequest, IngredientResponse, RecipeIngredientResponse, RecipeRequest,
    RecipeResponse, RecipeSummaryResponse, ShortLinkResponse,
};
use crate::inbound::http::schemas::{
    AuthorPageSchema, ErrorCodeSchema, ErrorSchema, RecipePageSchema, UserPageSchema,
};
use crate::inbound::http::users_dto::{
    AuthorResponse, AvatarRequest, AvatarResponse, LoginRequest, RegisterRequest,
    RegisteredUserResponse, SetPasswordRequest, TokenResponse, UserResponse,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the token header security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "token",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "`Token <key>` where the key comes from POST /api/auth/token/login/.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Recipe sharing API",
        description = "Recipes, favorites, shopping carts and author subscriptions.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("token" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::register_user,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::set_password,
        crate::inbound::http::users::set_avatar,
        crate::inbound::http::users::clear_avatar,
        crate::inbound::http::users::list_subscriptions,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::subscribe,
        crate::inbound::http::users::unsubscribe,
        crate::inbound::http::recipes::list_recipes,
        crate::inbound::http::recipes::create_recipe,
        crate::inbound::http::recipes::download_shopping_cart,
        crate::inbound::http::recipes::get_recipe,
        crate::inbound::http::recipes::update_recipe,
        crate::inbound::http::recipes::delete_recipe,
        crate::inbound::http::recipes::get_link,
        crate::inbound::http::recipes::add_favorite,
        crate::inbound::http::recipes::remove_favorite,
        crate::inbound::http::recipes::add_to_cart,
        crate::inbound::http::recipes::remove_from_cart,
        crate::inbound::http::ingredients::search_ingredients,
        crate::inbound::http::ingredients::get_ingredient,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RecipePageSchema,
        UserPageSchema,
        AuthorPageSchema,
        RecipeRequest,
        IngredientAmountRequest,
        RecipeResponse,
        RecipeIngredientResponse,
        RecipeSummaryResponse,
        IngredientResponse,
        ShortLinkResponse,
        RegisterRequest,
        RegisteredUserResponse,
        UserResponse,
        AuthorResponse,
        SetPasswordRequest,
        AvatarRequest,
        AvatarResponse,
        LoginRequest,
        TokenResponse,
        HealthStatus,
    )),
    tags(
        (name = "auth", description = "Token login and logout"),
        (name = "users", description = "Accounts, avatars and subscriptions"),
        (name = "recipes", description = "Recipes, favorites and the shopping cart"),
        (name = "ingredients", description = "Read-only ingredient catalog"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated OpenAPI document.

    use super::*;
    use crate::test_support::openapi::{get_property, unwrap_object_schema};
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::security::SecurityScheme;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    #[test]
    fn error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = unwrap_object_schema(
            schemas.get(ERROR_SCHEMA_NAME).expect("Error schema"),
            ERROR_SCHEMA_NAME,
        );

        get_property(error_schema, "code");
        get_property(error_schema, "message");
        get_property(error_schema, "traceId");
    }

    #[test]
    fn recipe_schema_exposes_viewer_flags() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let recipe = unwrap_object_schema(
            schemas.get("RecipeResponse").expect("RecipeResponse schema"),
            "RecipeResponse",
        );

        for field in ["is_favorited", "is_in_shopping_cart", "author", "ingredients"] {
            get_property(recipe, field);
        }
    }

    #[test]
    fn token_scheme_reads_the_authorization_header() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        let scheme = components
            .security_schemes
            .get("token")
            .expect("token scheme");
        assert!(matches!(
            scheme,
            SecurityScheme::ApiKey(utoipa::openapi::security::ApiKey::Header(_))
        ));
    }

    #[rstest]
    #[case("/api/recipes/")]
    #[case("/api/recipes/{id}/")]
    #[case("/api/recipes/{id}/favorite/")]
    #[case("/api/recipes/{id}/shopping_cart/")]
    #[case("/api/recipes/download_shopping_cart/")]
    #[case("/api/users/subscriptions/")]
    #[case("/api/users/me/avatar/")]
    #[case("/api/ingredients/")]
    #[case("/api/auth/token/logout/")]
    #[case("/health/ready")]
    fn documents_every_public_route(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }
}
