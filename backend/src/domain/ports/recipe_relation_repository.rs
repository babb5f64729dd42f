//! Port for favorite and shopping-cart relation rows.

use async_trait::async_trait;

use crate::domain::{IngredientTotal, RecipeId, RelationKind, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by relation repository adapters.
    pub enum RecipeRelationRepositoryError repository "relation" {
        /// The `(user, recipe)` pair already exists.
        Duplicate { message: String } =>
            "relation already exists: {message}",
        /// The recipe vanished before the row was written.
        MissingRecipe { message: String } =>
            "relation references a missing recipe: {message}",
    }
}

/// Viewer-relative relation flags for one recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeFlags {
    /// Recipe the flags describe.
    pub recipe_id: RecipeId,
    /// The viewer favorited the recipe.
    pub is_favorited: bool,
    /// The recipe is in the viewer's cart.
    pub is_in_shopping_cart: bool,
}

/// Favorite and cart storage.
///
/// `add` must rely on the storage unique constraint so concurrent inserts of
/// the same pair surface as [`RecipeRelationRepositoryError::Duplicate`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRelationRepository: Send + Sync {
    /// Insert a `(user, recipe)` pair.
    async fn add(
        &self,
        kind: RelationKind,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<(), RecipeRelationRepositoryError>;

    /// Delete a pair, returning whether it existed.
    async fn remove(
        &self,
        kind: RelationKind,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<bool, RecipeRelationRepositoryError>;

    /// Flags for each listed recipe, in the order given.
    async fn flags(
        &self,
        user: &UserId,
        recipes: &[RecipeId],
    ) -> Result<Vec<RecipeFlags>, RecipeRelationRepositoryError>;

    /// Number of recipes in the user's cart.
    async fn cart_size(&self, user: &UserId) -> Result<u64, RecipeRelationRepositoryError>;

    /// Ingredient amounts across the cart, summed per `(name, unit)`.
    async fn cart_totals(
        &self,
        user: &UserId,
    ) -> Result<Vec<IngredientTotal>, RecipeRelationRepositoryError>;
}
