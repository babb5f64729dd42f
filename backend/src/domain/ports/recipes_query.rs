//! Driving port for recipe reads.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{Error, RecipeFilter, RecipeId, RecipeView, UserId};

use super::Listing;

/// Domain use-case port for reading recipes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipesQuery: Send + Sync {
    /// List recipes newest first. The filter carries the viewer.
    async fn list(
        &self,
        filter: RecipeFilter,
        page: PageRequest,
    ) -> Result<Listing<RecipeView>, Error>;

    /// Fetch one recipe as seen by `viewer`.
    async fn get(&self, viewer: Option<UserId>, id: RecipeId) -> Result<RecipeView, Error>;

    /// Build a short link for an existing recipe.
    async fn short_link(&self, id: RecipeId) -> Result<String, Error>;
}
