//! Port for follower relation rows.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{User, UserId};

use super::{Listing, define_port_error};

define_port_error! {
    /// Errors raised by subscription repository adapters.
    pub enum SubscriptionRepositoryError repository "subscription" {
        /// The follower already follows the author.
        Duplicate { message: String } =>
            "subscription already exists: {message}",
        /// Storage refused a follower equal to the author.
        SelfSubscription { message: String } =>
            "users cannot subscribe to themselves: {message}",
    }
}

/// Follower relation storage, guarded by a unique `(user, author)`
/// constraint and a `user <> author` check.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Record that `follower` follows `author`.
    async fn add(&self, follower: &UserId, author: &UserId)
    -> Result<(), SubscriptionRepositoryError>;

    /// Remove the relation, returning whether it existed.
    async fn remove(
        &self,
        follower: &UserId,
        author: &UserId,
    ) -> Result<bool, SubscriptionRepositoryError>;

    /// Authors followed by `follower`, ordered by username.
    async fn authors(
        &self,
        follower: &UserId,
        page: PageRequest,
    ) -> Result<Listing<User>, SubscriptionRepositoryError>;

    /// Subset of `candidates` that `follower` follows.
    async fn followed_among(
        &self,
        follower: &UserId,
        candidates: &[UserId],
    ) -> Result<Vec<UserId>, SubscriptionRepositoryError>;
}
