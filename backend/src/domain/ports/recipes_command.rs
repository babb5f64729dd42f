//! Driving port for recipe mutations.
//!
//! The caller's identity is explicit on every operation; only the author may
//! update or delete a recipe. Updates take the raw payload so existence and
//! authorship are settled before the body is validated.

use async_trait::async_trait;

use crate::domain::{Error, RecipeDraft, RecipeId, RecipeInput, RecipeView, UserId};

/// Domain use-case port for writing recipes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipesCommand: Send + Sync {
    /// Create a recipe authored by `author`.
    async fn create(&self, author: &UserId, draft: RecipeDraft) -> Result<RecipeView, Error>;

    /// Update a recipe, replacing its ingredient set.
    ///
    /// A missing recipe is `not_found` and a foreign one is `forbidden`,
    /// whatever the payload holds.
    async fn update(
        &self,
        caller: &UserId,
        id: RecipeId,
        input: RecipeInput,
    ) -> Result<RecipeView, Error>;

    /// Delete a recipe and everything that references it.
    async fn delete(&self, caller: &UserId, id: RecipeId) -> Result<(), Error>;
}
