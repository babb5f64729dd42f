//! OpenAPI schema definitions for domain and envelope types.
//!
//! Domain types and the `pagination` crate stay framework-agnostic by not
//! deriving `ToSchema`. The wrappers here mirror their serialised shape so
//! utoipa can document them from the inbound adapter layer.

use utoipa::ToSchema;

use crate::inbound::http::recipes_dto::RecipeResponse;
use crate::inbound::http::users_dto::{AuthorResponse, UserResponse};

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request clashes with existing state.
    #[schema(rename = "conflict")]
    Conflict,
    /// The verb is not supported on this resource.
    #[schema(rename = "method_not_allowed")]
    MethodNotAllowed,
    /// A dependency is temporarily unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message. Validation failures name the offending field in `details`.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "recipe must list at least one ingredient")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "01HZY8B2W6X5Y7Z9ABCD1234")]
    trace_id: Option<String>,
    /// `{"field": ..., "code": ...}` for validation failures.
    #[schema(example = json!({"field": "ingredients", "code": "empty_ingredients"}))]
    details: Option<serde_json::Value>,
}

/// Paginated recipe listing.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct RecipePageSchema {
    /// Total matching recipes.
    count: u64,
    /// Absolute URL of the next page.
    next: Option<String>,
    /// Absolute URL of the previous page.
    previous: Option<String>,
    results: Vec<RecipeResponse>,
}

/// Paginated user listing.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserPageSchema {
    /// Total users.
    count: u64,
    next: Option<String>,
    previous: Option<String>,
    results: Vec<UserResponse>,
}

/// Paginated followed authors.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct AuthorPageSchema {
    /// Total followed authors.
    count: u64,
    next: Option<String>,
    previous: Option<String>,
    results: Vec<AuthorResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_code_schema_lists_every_domain_code() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        // utoipa replaces :: with . in schema names
        assert_eq!(ErrorCodeSchema::name(), "crate.domain.ErrorCode");
        for code in [
            "invalid_request",
            "unauthorized",
            "forbidden",
            "not_found",
            "conflict",
            "method_not_allowed",
            "service_unavailable",
            "internal_error",
        ] {
            assert!(schema_json.contains(code), "missing {code}");
        }
    }

    #[test]
    fn error_schema_uses_camel_case_trace_id() {
        let schema_json = schema_to_json::<ErrorSchema>();
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        assert!(schema_json.contains("traceId"), "{schema_json}");
        assert!(!schema_json.contains("trace_id"), "{schema_json}");
    }

    #[test]
    fn page_schemas_carry_the_envelope() {
        let schema_json = schema_to_json::<RecipePageSchema>();
        for field in ["count", "next", "previous", "results"] {
            assert!(schema_json.contains(field), "missing {field}");
        }
    }
}
