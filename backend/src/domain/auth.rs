//! Authentication primitives: passwords, login credentials and API tokens.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use rand::RngCore;
use zeroize::Zeroizing;

use super::EmailAddress;

/// Number of random bytes in an API token key.
const TOKEN_BYTES: usize = 20;

/// Domain error returned when authentication payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValidationError {
    /// Email was missing or malformed.
    InvalidEmail,
    /// A password field was blank.
    EmptyPassword {
        /// Request field carrying the password.
        field: &'static str,
    },
    /// The new password equals the current one.
    PasswordUnchanged,
    /// A token did not have the expected shape.
    MalformedToken,
}

impl AuthValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "email",
            Self::EmptyPassword { field } => field,
            Self::PasswordUnchanged => "new_password",
            Self::MalformedToken => "token",
        }
    }

    /// Machine-readable validation code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "invalid_email",
            Self::EmptyPassword { .. } => "empty_password",
            Self::PasswordUnchanged => "password_unchanged",
            Self::MalformedToken => "malformed_token",
        }
    }
}

impl fmt::Display for AuthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyPassword { field } => write!(f, "{field} must not be empty"),
            Self::PasswordUnchanged => {
                write!(f, "new password must differ from the current password")
            }
            Self::MalformedToken => write!(f, "token is malformed"),
        }
    }
}

impl std::error::Error for AuthValidationError {}

/// Plain-text password held in zeroizing memory.
///
/// Whitespace is preserved to avoid surprising credential comparisons.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate a password supplied through `field`.
    pub fn new(field: &'static str, password: &str) -> Result<Self, AuthValidationError> {
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword { field });
        }
        Ok(Self(Zeroizing::new(password.to_owned())))
    }

    /// Expose the secret for hashing or verification.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(**redacted**)")
    }
}

/// Validated login credentials.
///
/// # Examples
/// ```
/// use recipe_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("cook@example.com", "secret").unwrap();
/// assert_eq!(creds.email().as_ref(), "cook@example.com");
/// assert_eq!(creds.password().expose(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Password,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        let email = EmailAddress::new(email).map_err(|_| AuthValidationError::InvalidEmail)?;
        let password = Password::new("password", password)?;
        Ok(Self { email, password })
    }

    /// Email used to look up the account.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password supplied by the caller.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Validated password change request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChange {
    current: Password,
    new: Password,
}

impl PasswordChange {
    /// Validate a change: both values present and different.
    pub fn try_from_parts(current: &str, new: &str) -> Result<Self, AuthValidationError> {
        let current = Password::new("current_password", current)?;
        let new = Password::new("new_password", new)?;
        if current == new {
            return Err(AuthValidationError::PasswordUnchanged);
        }
        Ok(Self { current, new })
    }

    /// Password the caller claims is current.
    pub fn current(&self) -> &Password {
        &self.current
    }

    /// Replacement password.
    pub fn new_password(&self) -> &Password {
        &self.new
    }
}

/// Opaque API token presented as `Authorization: Token <key>`.
///
/// Keys are 40 lowercase hex characters.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AuthToken(String);

impl AuthToken {
    /// Generate a fresh random token.
    pub fn generate() -> Self {
        let mut bytes = [0_u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Parse a token presented by a client.
    pub fn parse(raw: &str) -> Result<Self, AuthValidationError> {
        let well_formed = raw.len() == TOKEN_BYTES * 2
            && raw.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase());
        if well_formed {
            Ok(Self(raw.to_owned()))
        } else {
            Err(AuthValidationError::MalformedToken)
        }
    }

    /// Token key text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.0.get(..6).unwrap_or_default();
        write!(f, "AuthToken({prefix}…)")
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", AuthValidationError::InvalidEmail)]
    #[case("not-an-email", "pw", AuthValidationError::InvalidEmail)]
    #[case("cook@example.com", "", AuthValidationError::EmptyPassword { field: "password" })]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: AuthValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn passwords_keep_whitespace() {
        let creds = LoginCredentials::try_from_parts("cook@example.com", " pw ")
            .expect("valid inputs should succeed");
        assert_eq!(creds.password().expose(), " pw ");
    }

    #[rstest]
    #[case("", "new", AuthValidationError::EmptyPassword { field: "current_password" })]
    #[case("old", "", AuthValidationError::EmptyPassword { field: "new_password" })]
    #[case("same", "same", AuthValidationError::PasswordUnchanged)]
    fn invalid_password_changes(
        #[case] current: &str,
        #[case] new: &str,
        #[case] expected: AuthValidationError,
    ) {
        let err = PasswordChange::try_from_parts(current, new).expect_err("must fail");
        assert_eq!(err, expected);
        assert_eq!(err.field(), expected.field());
    }

    #[rstest]
    fn generated_tokens_parse() {
        let token = AuthToken::generate();
        assert_eq!(token.as_str().len(), 40);
        assert_eq!(AuthToken::parse(token.as_str()), Ok(token));
    }

    #[rstest]
    #[case("short")]
    #[case("ZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZ")]
    #[case("ABCDEF0123456789ABCDEF0123456789ABCDEF01")]
    fn malformed_tokens_are_rejected(#[case] raw: &str) {
        assert_eq!(
            AuthToken::parse(raw),
            Err(AuthValidationError::MalformedToken)
        );
    }

    #[rstest]
    fn debug_output_hides_secrets() {
        let password = Password::new("password", "hunter2").expect("valid password");
        assert!(!format!("{password:?}").contains("hunter2"));
        let token = AuthToken::generate();
        assert!(!format!("{token:?}").contains(token.as_str()));
    }
}
