//! Port for API token storage.

use async_trait::async_trait;

use crate::domain::{AuthToken, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token repository adapters.
    pub enum AuthTokenRepositoryError repository "token" {}
}

/// Token storage holding at most one token per user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthTokenRepository: Send + Sync {
    /// Return the user's existing token, or store `candidate` and return it.
    async fn issue(
        &self,
        user: &UserId,
        candidate: &AuthToken,
    ) -> Result<AuthToken, AuthTokenRepositoryError>;

    /// Resolve a token to its owner.
    async fn find_user(&self, token: &AuthToken)
    -> Result<Option<UserId>, AuthTokenRepositoryError>;

    /// Delete the user's token, if any.
    async fn revoke(&self, user: &UserId) -> Result<(), AuthTokenRepositoryError>;
}
