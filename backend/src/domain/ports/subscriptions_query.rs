//! Driving port for listing followed authors.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{AuthorProfile, Error, RecipesLimit, UserId};

use super::Listing;

/// Domain use-case port for subscription reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionsQuery: Send + Sync {
    /// Authors followed by `follower`, each with a capped recipe sample.
    async fn subscriptions(
        &self,
        follower: &UserId,
        page: PageRequest,
        recipes_limit: RecipesLimit,
    ) -> Result<Listing<AuthorProfile>, Error>;
}
