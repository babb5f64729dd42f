//! Port for recipe aggregate persistence.
//!
//! A recipe and its ingredient rows are written as one unit: `create`,
//! `update` and `delete` must each run in a single transaction so a failed
//! ingredient write never leaves an orphaned or half-updated recipe behind.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageRequest;

use crate::domain::{IngredientLine, Recipe, RecipeFilter, RecipeId, RecipeSummary, UserId};

use super::{Listing, define_port_error};

define_port_error! {
    /// Errors raised by recipe repository adapters.
    pub enum RecipeRepositoryError repository "recipe" {
        /// An ingredient row referenced a missing catalog entry.
        UnknownIngredient { message: String } =>
            "recipe references an unknown ingredient: {message}",
    }
}

/// Recipe row plus ingredient lines to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipeRecord {
    /// Author of the recipe.
    pub author: UserId,
    /// Title.
    pub name: String,
    /// Description.
    pub text: String,
    /// Stored image path.
    pub image: String,
    /// Cooking time in minutes.
    pub cooking_time: u32,
    /// Ingredient lines.
    pub ingredients: Vec<IngredientLine>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Field changes plus the replacement ingredient set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeUpdateRecord {
    /// New title.
    pub name: Option<String>,
    /// New description.
    pub text: Option<String>,
    /// New stored image path.
    pub image: Option<String>,
    /// New cooking time.
    pub cooking_time: Option<u32>,
    /// Lines replacing every stored ingredient row.
    pub ingredients: Vec<IngredientLine>,
}

/// Recipe storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Insert the recipe and its ingredient rows in one transaction.
    async fn create(&self, record: &NewRecipeRecord) -> Result<Recipe, RecipeRepositoryError>;

    /// Apply field changes and replace the ingredient rows in one
    /// transaction. Returns `None` when the recipe does not exist.
    async fn update(
        &self,
        id: RecipeId,
        changes: &RecipeUpdateRecord,
    ) -> Result<Option<Recipe>, RecipeRepositoryError>;

    /// Delete ingredient rows, relation rows and the recipe in one
    /// transaction. Returns whether a recipe was removed.
    async fn delete(&self, id: RecipeId) -> Result<bool, RecipeRepositoryError>;

    /// Fetch a recipe with its ingredients.
    async fn find(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError>;

    /// List recipes newest first.
    async fn list(
        &self,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> Result<Listing<Recipe>, RecipeRepositoryError>;

    /// Newest recipes by `author`, at most `limit` when given.
    async fn summaries_by_author(
        &self,
        author: &UserId,
        limit: Option<usize>,
    ) -> Result<Vec<RecipeSummary>, RecipeRepositoryError>;

    /// Number of recipes published by `author`.
    async fn count_by_author(&self, author: &UserId) -> Result<u64, RecipeRepositoryError>;
}
