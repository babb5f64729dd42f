//! Driving port for token login and request authentication.
//!
//! Inbound adapters call it to exchange credentials for a token and to
//! resolve the `Authorization` header without importing persistence.

use async_trait::async_trait;

use crate::domain::{AuthToken, Error, LoginCredentials, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Verify credentials and return the user's token, issuing one if needed.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthToken, Error>;

    /// Revoke the user's token.
    async fn logout(&self, user: &UserId) -> Result<(), Error>;

    /// Resolve a presented token to its owner.
    async fn authenticate(&self, token: &AuthToken) -> Result<UserId, Error>;
}
