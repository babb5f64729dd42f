//! Shared validation helpers for inbound HTTP adapters.
//!
//! Domain value objects report failures as small enums. These helpers turn
//! them into `invalid_request` errors whose `details` name the request field
//! and a machine-readable code, so every endpoint reports validation the same
//! way.

use serde_json::json;

use crate::domain::{
    AuthValidationError, Error, ImageValidationError, RecipeValidationError, UserId,
    UserValidationError,
};

/// Validation error codes owned by the HTTP adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    field_error(
        field,
        ErrorCode::MissingField.as_str(),
        format!("missing required field: {field}"),
    )
}

/// Require a JSON field that serde accepted as optional.
pub(crate) fn require_field<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn user_validation_error(err: &UserValidationError) -> Error {
    field_error(err.field(), err.code(), err.to_string())
}

pub(crate) fn auth_validation_error(err: &AuthValidationError) -> Error {
    field_error(err.field(), err.code(), err.to_string())
}

pub(crate) fn image_validation_error(field: FieldName, err: &ImageValidationError) -> Error {
    field_error(field.as_str(), err.code(), err.to_string())
}

pub(crate) fn recipe_validation_error(err: &RecipeValidationError) -> Error {
    crate::domain::recipe_validation_error(err)
}

/// Parse a user id taken from the URL path.
///
/// A malformed id cannot name an existing user, so it is reported as not
/// found rather than as a validation failure.
pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|_| Error::not_found("user not found"))
}

/// Parse an optional user id filter taken from the query string.
pub(crate) fn parse_user_filter(raw: Option<&str>, field: FieldName) -> Result<Option<UserId>, Error> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            UserId::new(value).map_err(|_| {
                field_error(
                    field.as_str(),
                    "invalid_uuid",
                    format!("{} must be a valid UUID", field.as_str()),
                )
            })
        })
        .transpose()
}
