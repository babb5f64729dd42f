//! Driving port for following and unfollowing authors.

use async_trait::async_trait;

use crate::domain::{AuthorProfile, Error, RecipesLimit, UserId};

/// Domain use-case port for subscription mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionsCommand: Send + Sync {
    /// Follow `author` and return their profile with a recipe sample.
    async fn subscribe(
        &self,
        follower: &UserId,
        author: &UserId,
        recipes_limit: RecipesLimit,
    ) -> Result<AuthorProfile, Error>;

    /// Stop following `author`. Fails with not found when not following.
    async fn unsubscribe(&self, follower: &UserId, author: &UserId) -> Result<(), Error>;
}
