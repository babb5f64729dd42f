//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the recipe domain's
//! repository ports backed by PostgreSQL via the Diesel ORM with async
//! support through `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Transactions**: recipe writes touch the header and its ingredient
//!   lines in one transaction.
//! - **Strongly typed errors**: Constraint violations surface as the port's
//!   own variants (duplicate, unknown ingredient, self-subscription).
//!
//! # Example
//!
//! ```ignore
//! use recipe_backend::outbound::persistence::{DbPool, PoolConfig, DieselRecipeRepository};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/recipes")).await?;
//! let recipes = DieselRecipeRepository::new(pool);
//! ```

mod diesel_auth_token_repository;
mod diesel_error_mapping;
mod diesel_ingredient_repository;
mod diesel_recipe_relation_repository;
mod diesel_recipe_repository;
mod diesel_subscription_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_auth_token_repository::DieselAuthTokenRepository;
pub use diesel_ingredient_repository::DieselIngredientRepository;
pub use diesel_recipe_relation_repository::DieselRecipeRelationRepository;
pub use diesel_recipe_repository::DieselRecipeRepository;
pub use diesel_subscription_repository::DieselSubscriptionRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, apply_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
