//! Translate port errors into API-facing [`Error`] values.
//!
//! Connection failures become `service_unavailable`; query failures become
//! `internal_error` so their detail is logged but never returned to clients.

use serde_json::json;

use super::Error;
use super::ports::{
    AuthTokenRepositoryError, IngredientRepositoryError, MediaStorageError, PasswordHasherError,
    RecipeRelationRepositoryError, RecipeRepositoryError, SubscriptionRepositoryError,
    UserRepositoryError,
};

/// Validation failure naming the offending request field.
pub(crate) fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

pub(crate) fn map_ingredient_repository_error(error: IngredientRepositoryError) -> Error {
    error.to_api_error()
}

pub(crate) fn map_recipe_repository_error(error: RecipeRepositoryError) -> Error {
    match error {
        RecipeRepositoryError::UnknownIngredient { .. } => field_error(
            "ingredients",
            "unknown_ingredient",
            "ingredients reference an unknown ingredient",
        ),
        other => other.to_api_error(),
    }
}

pub(crate) fn map_relation_repository_error(error: RecipeRelationRepositoryError) -> Error {
    match error {
        RecipeRelationRepositoryError::Duplicate { message } => Error::conflict(message),
        RecipeRelationRepositoryError::MissingRecipe { .. } => {
            Error::not_found("recipe not found")
        }
        other => other.to_api_error(),
    }
}

pub(crate) fn map_user_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Duplicate { field } => {
            Error::conflict(format!("{field} is already taken")).with_details(json!({
                "field": field,
                "code": "duplicate",
            }))
        }
        other => other.to_api_error(),
    }
}

pub(crate) fn map_subscription_repository_error(error: SubscriptionRepositoryError) -> Error {
    match error {
        SubscriptionRepositoryError::Duplicate { .. } => {
            Error::conflict("already subscribed to this user")
        }
        SubscriptionRepositoryError::SelfSubscription { .. } => {
            Error::conflict("cannot subscribe to yourself")
        }
        other => other.to_api_error(),
    }
}

pub(crate) fn map_token_repository_error(error: AuthTokenRepositoryError) -> Error {
    error.to_api_error()
}

pub(crate) fn map_media_error(error: MediaStorageError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn connection_failures_are_unavailable() {
        let err = map_recipe_repository_error(RecipeRepositoryError::connection("refused"));
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
        assert_eq!(err.message(), "recipe repository unavailable: refused");
    }

    #[rstest]
    fn query_failures_are_internal() {
        let err = map_token_repository_error(AuthTokenRepositoryError::query("timeout"));
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[rstest]
    fn unknown_ingredients_are_validation_errors() {
        let err = map_recipe_repository_error(RecipeRepositoryError::unknown_ingredient("fk"));
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details["field"], "ingredients");
    }

    #[rstest]
    fn duplicate_usernames_conflict() {
        let err = map_user_repository_error(UserRepositoryError::duplicate("username"));
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.message(), "username is already taken");
    }

    #[rstest]
    fn self_subscription_conflicts() {
        let err = map_subscription_repository_error(
            SubscriptionRepositoryError::self_subscription("check"),
        );
        assert_eq!(err.code(), ErrorCode::Conflict);
    }
}
