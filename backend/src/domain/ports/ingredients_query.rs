//! Driving port for ingredient catalog reads.

use async_trait::async_trait;

use crate::domain::{Error, Ingredient, IngredientId};

/// Domain use-case port for browsing the catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IngredientsQuery: Send + Sync {
    /// Case-insensitive prefix search by name; `None` lists everything.
    async fn search(&self, name: Option<String>) -> Result<Vec<Ingredient>, Error>;

    /// Fetch one ingredient or fail with not found.
    async fn get(&self, id: IngredientId) -> Result<Ingredient, Error>;
}
