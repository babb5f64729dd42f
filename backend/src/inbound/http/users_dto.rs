//! Request and response payloads for user, subscription and token endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    AuthorProfile, EmailAddress, Error, LoginCredentials, Password, PasswordChange, PersonName,
    PublicUrls, User, UserProfile, UserRegistration, Username,
};
use crate::inbound::http::recipes_dto::RecipeSummaryResponse;
use crate::inbound::http::validation::{
    FieldName, auth_validation_error, require_field, user_validation_error,
};

/// User representation shared by every endpoint that returns a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "Ada")]
    pub first_name: String,
    #[schema(example = "Lovelace")]
    pub last_name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Whether the caller follows this user; always `false` for anonymous
    /// callers.
    pub is_subscribed: bool,
    /// Absolute avatar URL, if one was uploaded.
    pub avatar: Option<String>,
}

impl UserResponse {
    /// Render a profile, resolving the avatar path to an absolute URL.
    pub fn from_profile(profile: UserProfile, urls: &PublicUrls) -> Self {
        let UserProfile {
            user,
            is_subscribed,
        } = profile;
        Self {
            id: user.id.to_string(),
            username: user.username.into(),
            first_name: user.first_name.to_string(),
            last_name: user.last_name.to_string(),
            email: user.email.into(),
            is_subscribed,
            avatar: user.avatar.as_deref().map(|path| urls.media(path)),
        }
    }
}

/// Registration body for `POST /api/users/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

impl TryFrom<RegisterRequest> for UserRegistration {
    type Error = Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        let email = require_field(value.email, FieldName::new("email"))?;
        let username = require_field(value.username, FieldName::new("username"))?;
        let first_name = require_field(value.first_name, FieldName::new("first_name"))?;
        let last_name = require_field(value.last_name, FieldName::new("last_name"))?;
        let password = require_field(value.password, FieldName::new("password"))?;
        Ok(Self {
            email: EmailAddress::new(email).map_err(|err| user_validation_error(&err))?,
            username: Username::new(username).map_err(|err| user_validation_error(&err))?,
            first_name: PersonName::new("first_name", first_name)
                .map_err(|err| user_validation_error(&err))?,
            last_name: PersonName::new("last_name", last_name)
                .map_err(|err| user_validation_error(&err))?,
            password: Password::new("password", &password)
                .map_err(|err| auth_validation_error(&err))?,
        })
    }
}

/// Registration response; carries no relation flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RegisteredUserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for RegisteredUserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.into(),
            username: user.username.into(),
            first_name: user.first_name.to_string(),
            last_name: user.last_name.to_string(),
        }
    }
}

/// Body for `POST /api/users/set_password/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct SetPasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

impl TryFrom<SetPasswordRequest> for PasswordChange {
    type Error = Error;

    fn try_from(value: SetPasswordRequest) -> Result<Self, Self::Error> {
        let current = require_field(value.current_password, FieldName::new("current_password"))?;
        let new = require_field(value.new_password, FieldName::new("new_password"))?;
        Self::try_from_parts(&current, &new).map_err(|err| auth_validation_error(&err))
    }
}

/// Body for `PUT /api/users/me/avatar/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct AvatarRequest {
    /// `data:image/<type>;base64,<payload>` URI.
    pub avatar: Option<String>,
}

/// Response for a stored avatar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AvatarResponse {
    /// Absolute avatar URL.
    pub avatar: String,
}

/// Body for `POST /api/auth/token/login/`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = Error;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        let email = require_field(value.email, FieldName::new("email"))?;
        let password = require_field(value.password, FieldName::new("password"))?;
        Self::try_from_parts(&email, &password).map_err(|err| auth_validation_error(&err))
    }
}

/// Issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    #[schema(example = "0123456789abcdef0123456789abcdef01234567")]
    pub auth_token: String,
}

/// Followed author with a capped sample of their recipes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthorResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<RecipeSummaryResponse>,
    pub recipes_count: u64,
}

impl AuthorResponse {
    /// Render an author profile with absolute media URLs.
    pub fn from_author(author: AuthorProfile, urls: &PublicUrls) -> Self {
        Self {
            user: UserResponse::from_profile(author.profile, urls),
            recipes: author
                .recipes
                .into_iter()
                .map(|summary| RecipeSummaryResponse::from_summary(summary, urls))
                .collect(),
            recipes_count: author.recipes_count,
        }
    }
}

/// Query string shared by subscription endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipesLimitQuery {
    /// Maximum recipes listed per author; non-numeric values are ignored.
    pub recipes_limit: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::test_fixtures::user;
    use rstest::rstest;

    fn registration() -> RegisterRequest {
        RegisterRequest {
            email: Some("ada@example.com".to_owned()),
            username: Some("ada".to_owned()),
            first_name: Some("Ada".to_owned()),
            last_name: Some("Lovelace".to_owned()),
            password: Some("s3cret".to_owned()),
        }
    }

    #[rstest]
    fn complete_registrations_validate() {
        let parsed = UserRegistration::try_from(registration()).expect("valid");
        assert_eq!(parsed.username.as_ref(), "ada");
    }

    #[rstest]
    #[case(RegisterRequest { password: None, ..registration() }, "password", "missing_field")]
    #[case(RegisterRequest { email: Some("nope".to_owned()), ..registration() }, "email", "invalid")]
    #[case(RegisterRequest { first_name: Some("  ".to_owned()), ..registration() }, "first_name", "empty")]
    fn invalid_registrations_name_the_field(
        #[case] request: RegisterRequest,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let err = UserRegistration::try_from(request).expect_err("invalid");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details["field"], field);
        assert_eq!(details["code"], code);
    }

    #[rstest]
    fn unchanged_passwords_are_rejected() {
        let err = PasswordChange::try_from(SetPasswordRequest {
            current_password: Some("same".to_owned()),
            new_password: Some("same".to_owned()),
        })
        .expect_err("unchanged");
        assert_eq!(err.details().expect("details")["code"], "password_unchanged");
    }

    #[rstest]
    fn avatars_render_as_absolute_urls() {
        let mut ada = user("ada");
        ada.avatar = Some("users/ada.png".to_owned());
        let urls = PublicUrls::new("https://recipes.example");

        let response = UserResponse::from_profile(
            UserProfile {
                user: ada,
                is_subscribed: true,
            },
            &urls,
        );

        assert_eq!(
            response.avatar.as_deref(),
            Some("https://recipes.example/media/users/ada.png")
        );
        assert!(response.is_subscribed);
    }
}
