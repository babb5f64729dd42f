//! Token login service implementing [`LoginService`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::error_mapping::{map_token_repository_error, map_user_repository_error};
use super::ports::{AuthTokenRepository, LoginService, PasswordHasher, UserRepository};
use super::{AuthToken, Error, LoginCredentials, UserId};

const INVALID_CREDENTIALS: &str = "unable to log in with the provided credentials";

/// Exchanges credentials for tokens and resolves tokens to users.
#[derive(Clone)]
pub struct TokenLoginService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn AuthTokenRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl TokenLoginService {
    /// Create a service from its collaborators.
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn AuthTokenRepository>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            users,
            tokens,
            hasher,
        }
    }
}

#[async_trait]
impl LoginService for TokenLoginService {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthToken, Error> {
        let stored = self
            .users
            .credentials_by_email(credentials.email())
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;
        if !self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
        {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        let token = self
            .tokens
            .issue(&stored.user_id, &AuthToken::generate())
            .await
            .map_err(map_token_repository_error)?;
        info!(user_id = %stored.user_id, "token issued");
        Ok(token)
    }

    async fn logout(&self, user: &UserId) -> Result<(), Error> {
        self.tokens
            .revoke(user)
            .await
            .map_err(map_token_repository_error)?;
        info!(user_id = %user, "token revoked");
        Ok(())
    }

    async fn authenticate(&self, token: &AuthToken) -> Result<UserId, Error> {
        self.tokens
            .find_user(token)
            .await
            .map_err(map_token_repository_error)?
            .ok_or_else(|| Error::unauthorized("invalid token"))
    }
}
