//! Domain primitives, aggregates, ports and services.
//!
//! Purpose: define strongly typed entities used by the API and persistence
//! layers, the ports adapters implement, and the services that enforce the
//! business rules. Nothing in this module knows about HTTP or SQL.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifiers.
//! - User, Recipe, Ingredient and relation types with validating
//!   constructors.
//! - ShoppingList: cart aggregation and rendering.
//! - Services implementing the driving ports in [`ports`].

pub mod auth;
mod auth_service;
mod error_mapping;
pub mod error;
pub mod image;
pub mod ingredient;
mod ingredient_service;
pub mod ports;
mod profiles;
pub mod recipe;
mod recipe_service;
pub mod relations;
mod relation_service;
pub mod shopping_list;
pub mod subscription;
mod subscription_service;
#[cfg(test)]
pub(crate) mod test_fixtures;
pub mod trace_id;
pub mod urls;
pub mod user;
mod user_service;

pub use self::auth::{AuthToken, AuthValidationError, LoginCredentials, Password, PasswordChange};
pub use self::auth_service::TokenLoginService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::image::{IMAGE_MAX_BYTES, ImageUpload, ImageValidationError};
pub use self::ingredient::{
    Ingredient, IngredientId, IngredientImportOutcome, IngredientValidationError, NewIngredient,
};
pub use self::ingredient_service::IngredientService;
pub use self::recipe::{
    CookingTime, IngredientLine, IngredientLineInput, IngredientSet, Recipe, RecipeChanges,
    RecipeDraft, RecipeFilter, RecipeId, RecipeIngredient, RecipeInput, RecipeName,
    RecipeSummary, RecipeText, RecipeValidationError, RecipeView,
};
pub(crate) use self::recipe_service::recipe_validation_error;
pub use self::recipe_service::{RECIPE_MEDIA_FOLDER, RecipeService, RecipeServicePorts};
pub use self::relation_service::RecipeRelationService;
pub use self::relations::RelationKind;
pub use self::shopping_list::{IngredientTotal, SHOPPING_LIST_FILENAME, ShoppingList};
pub use self::subscription::{AuthorProfile, RecipesLimit};
pub use self::subscription_service::SubscriptionService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::urls::PublicUrls;
pub use self::user::{
    EmailAddress, PersonName, User, UserId, UserProfile, UserRegistration, UserValidationError,
    Username,
};
pub use self::user_service::{AVATAR_MEDIA_FOLDER, UserService};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use recipe_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
