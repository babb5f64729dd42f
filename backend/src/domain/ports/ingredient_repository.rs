//! Port for the read-mostly ingredient catalog.

use async_trait::async_trait;

use crate::domain::{Ingredient, IngredientId, IngredientImportOutcome, NewIngredient};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ingredient repository adapters.
    pub enum IngredientRepositoryError repository "ingredient" {}
}

/// Catalog storage. The API never mutates it; only the bulk import writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IngredientRepository: Send + Sync {
    /// Ingredients whose name starts with `name_prefix`, ignoring case,
    /// ordered by name. An empty prefix returns the whole catalog.
    async fn search(&self, name_prefix: &str)
    -> Result<Vec<Ingredient>, IngredientRepositoryError>;

    /// Fetch one ingredient.
    async fn find(&self, id: IngredientId) -> Result<Option<Ingredient>, IngredientRepositoryError>;

    /// Fetch every listed ingredient that exists; unknown keys are omitted.
    async fn find_many(
        &self,
        ids: &[IngredientId],
    ) -> Result<Vec<Ingredient>, IngredientRepositoryError>;

    /// Insert pairs not yet present, matching on exact name and unit.
    async fn import(
        &self,
        ingredients: &[NewIngredient],
    ) -> Result<IngredientImportOutcome, IngredientRepositoryError>;
}
