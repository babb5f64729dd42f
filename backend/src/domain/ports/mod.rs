//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Outbound ports (`*Repository`, [`PasswordHasher`], [`MediaStorage`]) are
//! implemented by adapters under `outbound`. Driving ports (`*Command`,
//! `*Query`, [`LoginService`]) are implemented by domain services and called
//! by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_token_repository;
mod ingredient_repository;
mod ingredients_query;
mod listing;
mod login_service;
mod media_storage;
mod password_hasher;
mod recipe_relation_repository;
mod recipe_relations_command;
mod recipe_repository;
mod recipes_command;
mod recipes_query;
mod shopping_list_query;
mod subscription_repository;
mod subscriptions_command;
mod subscriptions_query;
mod user_repository;
mod users_command;
mod users_query;

#[cfg(test)]
pub use auth_token_repository::MockAuthTokenRepository;
pub use auth_token_repository::{AuthTokenRepository, AuthTokenRepositoryError};
#[cfg(test)]
pub use ingredient_repository::MockIngredientRepository;
pub use ingredient_repository::{IngredientRepository, IngredientRepositoryError};
#[cfg(test)]
pub use ingredients_query::MockIngredientsQuery;
pub use ingredients_query::IngredientsQuery;
pub use listing::Listing;
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use media_storage::MockMediaStorage;
pub use media_storage::{MediaStorage, MediaStorageError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use recipe_relation_repository::MockRecipeRelationRepository;
pub use recipe_relation_repository::{
    RecipeFlags, RecipeRelationRepository, RecipeRelationRepositoryError,
};
#[cfg(test)]
pub use recipe_relations_command::MockRecipeRelationsCommand;
pub use recipe_relations_command::RecipeRelationsCommand;
#[cfg(test)]
pub use recipe_repository::MockRecipeRepository;
pub use recipe_repository::{
    NewRecipeRecord, RecipeRepository, RecipeRepositoryError, RecipeUpdateRecord,
};
#[cfg(test)]
pub use recipes_command::MockRecipesCommand;
pub use recipes_command::RecipesCommand;
#[cfg(test)]
pub use recipes_query::MockRecipesQuery;
pub use recipes_query::RecipesQuery;
#[cfg(test)]
pub use shopping_list_query::MockShoppingListQuery;
pub use shopping_list_query::ShoppingListQuery;
#[cfg(test)]
pub use subscription_repository::MockSubscriptionRepository;
pub use subscription_repository::{SubscriptionRepository, SubscriptionRepositoryError};
#[cfg(test)]
pub use subscriptions_command::MockSubscriptionsCommand;
pub use subscriptions_command::SubscriptionsCommand;
#[cfg(test)]
pub use subscriptions_query::MockSubscriptionsQuery;
pub use subscriptions_query::SubscriptionsQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{NewUserRecord, StoredCredentials, UserRepository, UserRepositoryError};
#[cfg(test)]
pub use users_command::MockUsersCommand;
pub use users_command::UsersCommand;
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
