//! PostgreSQL-backed API token store.
//!
//! Each user holds at most one token. Issuing is idempotent: a concurrent
//! login that loses the insert race reads back the winner's key.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{AuthTokenRepository, AuthTokenRepositoryError};
use crate::domain::{AuthToken, UserId};

use super::diesel_error_mapping::{map_basic_diesel_error, pool_error_message};
use super::models::NewAuthTokenRow;
use super::pool::{DbPool, PoolError};
use super::schema::auth_tokens;

/// Diesel-backed implementation of the `AuthTokenRepository` port.
#[derive(Clone)]
pub struct DieselAuthTokenRepository {
    pool: DbPool,
}

impl DieselAuthTokenRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AuthTokenRepositoryError {
    AuthTokenRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> AuthTokenRepositoryError {
    map_basic_diesel_error(
        error,
        AuthTokenRepositoryError::query,
        AuthTokenRepositoryError::connection,
    )
}

fn stored_token(key: &str) -> Result<AuthToken, AuthTokenRepositoryError> {
    AuthToken::parse(key.trim_end())
        .map_err(|_| AuthTokenRepositoryError::query("stored token is malformed"))
}

#[async_trait]
impl AuthTokenRepository for DieselAuthTokenRepository {
    async fn issue(
        &self,
        user: &UserId,
        candidate: &AuthToken,
    ) -> Result<AuthToken, AuthTokenRepositoryError> {
        let user_id = *user.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(auth_tokens::table)
            .values(&NewAuthTokenRow {
                key: candidate.as_str(),
                user_id,
                created_at: Utc::now(),
            })
            .on_conflict(auth_tokens::user_id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let key: String = auth_tokens::table
            .filter(auth_tokens::user_id.eq(user_id))
            .select(auth_tokens::key)
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        stored_token(&key)
    }

    async fn find_user(
        &self,
        token: &AuthToken,
    ) -> Result<Option<UserId>, AuthTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_id: Option<Uuid> = auth_tokens::table
            .filter(auth_tokens::key.eq(token.as_str()))
            .select(auth_tokens::user_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(user_id.map(UserId::from_uuid))
    }

    async fn revoke(&self, user: &UserId) -> Result<(), AuthTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(auth_tokens::table.filter(auth_tokens::user_id.eq(user.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
