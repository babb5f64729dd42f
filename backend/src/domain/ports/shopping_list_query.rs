//! Driving port for the shopping-list download.

use async_trait::async_trait;

use crate::domain::{Error, ShoppingList, UserId};

/// Domain use-case port for aggregating a user's cart.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShoppingListQuery: Send + Sync {
    /// Aggregate the cart. An empty cart fails with an `empty_cart` error.
    async fn shopping_list(&self, user: &UserId) -> Result<ShoppingList, Error>;
}
