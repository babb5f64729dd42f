//! PostgreSQL-backed follower relation.

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::ports::{Listing, SubscriptionRepository, SubscriptionRepositoryError};
use crate::domain::{User, UserId};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::diesel_user_repository::{count_to_total, page_bounds, rows_to_users};
use super::models::{NewSubscriptionRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{subscriptions, users};

/// Diesel-backed implementation of the `SubscriptionRepository` port.
#[derive(Clone)]
pub struct DieselSubscriptionRepository {
    pool: DbPool,
}

impl DieselSubscriptionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SubscriptionRepositoryError {
    SubscriptionRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> SubscriptionRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => SubscriptionRepositoryError::connection(message),
        DieselFailure::Query(message) => SubscriptionRepositoryError::query(message),
        DieselFailure::UniqueViolation { constraint } => SubscriptionRepositoryError::duplicate(
            constraint.unwrap_or_else(|| "subscription".to_owned()),
        ),
        DieselFailure::CheckViolation { constraint } => {
            SubscriptionRepositoryError::self_subscription(
                constraint.unwrap_or_else(|| "subscription".to_owned()),
            )
        }
        DieselFailure::ForeignKeyViolation { .. } => {
            SubscriptionRepositoryError::query("subscription references a missing user")
        }
    }
}

#[async_trait]
impl SubscriptionRepository for DieselSubscriptionRepository {
    async fn add(
        &self,
        follower: &UserId,
        author: &UserId,
    ) -> Result<(), SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(subscriptions::table)
            .values(&NewSubscriptionRow {
                user_id: *follower.as_uuid(),
                author_id: *author.as_uuid(),
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn remove(
        &self,
        follower: &UserId,
        author: &UserId,
    ) -> Result<bool, SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(
            subscriptions::table
                .filter(subscriptions::user_id.eq(follower.as_uuid()))
                .filter(subscriptions::author_id.eq(author.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn authors(
        &self,
        follower: &UserId,
        page: PageRequest,
    ) -> Result<Listing<User>, SubscriptionRepositoryError> {
        let (limit, offset) = page_bounds(page);
        let follower_id = *follower.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = subscriptions::table
            .filter(subscriptions::user_id.eq(follower_id))
            .select(count_star())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<UserRow> = users::table
            .inner_join(subscriptions::table.on(subscriptions::author_id.eq(users::id)))
            .filter(subscriptions::user_id.eq(follower_id))
            .order(subscriptions::id.asc())
            .limit(limit)
            .offset(offset)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let authors = rows_to_users(rows)
            .map_err(|err| SubscriptionRepositoryError::query(err.to_string()))?;
        Ok(Listing::new(authors, count_to_total(total)))
    }

    async fn followed_among(
        &self,
        follower: &UserId,
        candidates: &[UserId],
    ) -> Result<Vec<UserId>, SubscriptionRepositoryError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = candidates.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let followed: Vec<Uuid> = subscriptions::table
            .filter(subscriptions::user_id.eq(follower.as_uuid()))
            .filter(subscriptions::author_id.eq_any(ids))
            .select(subscriptions::author_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(followed.into_iter().map(UserId::from_uuid).collect())
    }
}
