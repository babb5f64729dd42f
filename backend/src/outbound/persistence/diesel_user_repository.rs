//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Usernames and emails are unique in storage; the unique-violation constraint
//! name tells the adapter which field collided.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::ports::{Listing, NewUserRecord, StoredCredentials, UserRepository, UserRepositoryError};
use crate::domain::{EmailAddress, PersonName, User, UserId, Username};

use super::diesel_error_mapping::{
    DieselFailure, classify_diesel_error, constraint_mentions, pool_error_message,
};
use super::models::{CredentialsRow, NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    UserRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => UserRepositoryError::connection(message),
        DieselFailure::UniqueViolation { constraint } => {
            if constraint_mentions(constraint.as_deref(), "email") {
                UserRepositoryError::duplicate("email")
            } else {
                UserRepositoryError::duplicate("username")
            }
        }
        DieselFailure::Query(message) => UserRepositoryError::query(message),
        DieselFailure::ForeignKeyViolation { .. } | DieselFailure::CheckViolation { .. } => {
            UserRepositoryError::query("database constraint violated")
        }
    }
}

/// Convert a stored row to the domain user.
///
/// Stored values passed validation on the way in; a failure here means the
/// table was edited out of band.
pub(super) fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let username = Username::new(row.username)
        .map_err(|err| UserRepositoryError::query(format!("stored username invalid: {err}")))?;
    let email = EmailAddress::new(row.email)
        .map_err(|err| UserRepositoryError::query(format!("stored email invalid: {err}")))?;
    Ok(User {
        id: UserId::from_uuid(row.id),
        username,
        email,
        first_name: PersonName::from_stored(row.first_name),
        last_name: PersonName::from_stored(row.last_name),
        avatar: row.avatar,
    })
}

pub(super) fn rows_to_users(rows: Vec<UserRow>) -> Result<Vec<User>, UserRepositoryError> {
    rows.into_iter().map(row_to_user).collect()
}

fn credentials(row: CredentialsRow) -> StoredCredentials {
    StoredCredentials {
        user_id: UserId::from_uuid(row.id),
        password_hash: row.password_hash,
    }
}

/// Convert a page request into SQL `LIMIT`/`OFFSET` values.
pub(super) fn page_bounds(page: PageRequest) -> (i64, i64) {
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    (i64::from(page.limit()), offset)
}

/// Convert a SQL count into the domain total.
#[expect(clippy::cast_sign_loss, reason = "COUNT(*) is never negative")]
pub(super) fn count_to_total(count: i64) -> u64 {
    count as u64
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, record: &NewUserRecord) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: *record.id.as_uuid(),
            username: record.username.as_ref(),
            email: record.email.as_ref(),
            first_name: record.first_name.as_ref(),
            last_name: record.last_name.as_ref(),
            password_hash: record.password_hash.as_str(),
            created_at: Utc::now(),
        };
        let stored: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_user(stored)
    }

    async fn find(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(raw))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_users(rows)
    }

    async fn list(&self, page: PageRequest) -> Result<Listing<User>, UserRepositoryError> {
        let (limit, offset) = page_bounds(page);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<UserRow> = users::table
            .order((users::created_at.asc(), users::id.asc()))
            .limit(limit)
            .offset(offset)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Listing::new(rows_to_users(rows)?, count_to_total(total)))
    }

    async fn credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CredentialsRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(CredentialsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(credentials))
    }

    async fn credentials_by_id(
        &self,
        id: &UserId,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CredentialsRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(CredentialsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(credentials))
    }

    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(users::password_hash.eq(password_hash))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn set_avatar(
        &self,
        id: &UserId,
        avatar: Option<String>,
    ) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(users::avatar.eq(avatar))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
