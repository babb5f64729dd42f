//! Driving port for favorite and shopping-cart toggles.

use async_trait::async_trait;

use crate::domain::{Error, RecipeId, RecipeSummary, RelationKind, UserId};

/// Domain use-case port for the favorite and cart relations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRelationsCommand: Send + Sync {
    /// Add the pair. Fails with conflict when it is already present.
    async fn add(
        &self,
        kind: RelationKind,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<RecipeSummary, Error>;

    /// Remove the pair. Fails with not found when it is absent.
    async fn remove(&self, kind: RelationKind, user: &UserId, recipe: RecipeId)
    -> Result<(), Error>;
}
