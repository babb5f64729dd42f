//! Driving port for user-facing queries.
//!
//! Every read is relative to an optional viewer so profiles can carry the
//! `is_subscribed` flag.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{Error, UserId, UserProfile};

use super::Listing;

/// Domain use-case port for reading user profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Page through all users.
    async fn list(
        &self,
        viewer: Option<UserId>,
        page: PageRequest,
    ) -> Result<Listing<UserProfile>, Error>;

    /// Fetch one profile or fail with not found.
    async fn profile(&self, viewer: Option<UserId>, id: &UserId) -> Result<UserProfile, Error>;
}
