//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::PublicUrls;
use crate::domain::ports::{
    IngredientsQuery, LoginService, RecipeRelationsCommand, RecipesCommand, RecipesQuery,
    ShoppingListQuery, SubscriptionsCommand, SubscriptionsQuery, UsersCommand, UsersQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UsersQuery>,
    pub accounts: Arc<dyn UsersCommand>,
    pub subscriptions: Arc<dyn SubscriptionsCommand>,
    pub subscriptions_query: Arc<dyn SubscriptionsQuery>,
    pub recipes: Arc<dyn RecipesCommand>,
    pub recipes_query: Arc<dyn RecipesQuery>,
    pub relations: Arc<dyn RecipeRelationsCommand>,
    pub shopping_list: Arc<dyn ShoppingListQuery>,
    pub ingredients: Arc<dyn IngredientsQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UsersQuery>,
    pub accounts: Arc<dyn UsersCommand>,
    pub subscriptions: Arc<dyn SubscriptionsCommand>,
    pub subscriptions_query: Arc<dyn SubscriptionsQuery>,
    pub recipes: Arc<dyn RecipesCommand>,
    pub recipes_query: Arc<dyn RecipesQuery>,
    pub relations: Arc<dyn RecipeRelationsCommand>,
    pub shopping_list: Arc<dyn ShoppingListQuery>,
    pub ingredients: Arc<dyn IngredientsQuery>,
    /// Builds absolute media URLs for response bodies.
    pub urls: PublicUrls,
}

impl HttpState {
    /// Construct state from a ports bundle and the public site address.
    pub fn new(ports: HttpStatePorts, urls: PublicUrls) -> Self {
        let HttpStatePorts {
            login,
            users,
            accounts,
            subscriptions,
            subscriptions_query,
            recipes,
            recipes_query,
            relations,
            shopping_list,
            ingredients,
        } = ports;
        Self {
            login,
            users,
            accounts,
            subscriptions,
            subscriptions_query,
            recipes,
            recipes_query,
            relations,
            shopping_list,
            ingredients,
            urls,
        }
    }
}
