//! Builders wiring Diesel adapters and domain services into HTTP state.

use std::path::Path;
use std::sync::Arc;

use mockable::DefaultClock;

use recipe_backend::domain::ports::{
    AuthTokenRepository, IngredientRepository, MediaStorage, MediaStorageError, PasswordHasher,
    RecipeRelationRepository, RecipeRepository, SubscriptionRepository, UserRepository,
};
use recipe_backend::domain::{
    IngredientService, PublicUrls, RecipeRelationService, RecipeService, RecipeServicePorts,
    SubscriptionService, TokenLoginService, UserService,
};
use recipe_backend::inbound::http::state::{HttpState, HttpStatePorts};
use recipe_backend::outbound::media::FsMediaStorage;
use recipe_backend::outbound::persistence::{
    DbPool, DieselAuthTokenRepository, DieselIngredientRepository,
    DieselRecipeRelationRepository, DieselRecipeRepository, DieselSubscriptionRepository,
    DieselUserRepository,
};
use recipe_backend::outbound::security::Pbkdf2PasswordHasher;

/// Outbound adapters shared by every service.
struct Adapters {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn AuthTokenRepository>,
    ingredients: Arc<dyn IngredientRepository>,
    recipes: Arc<dyn RecipeRepository>,
    relations: Arc<dyn RecipeRelationRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    hasher: Arc<dyn PasswordHasher>,
    media: Arc<dyn MediaStorage>,
}

impl Adapters {
    fn new(pool: &DbPool, media_root: &Path) -> Result<Self, MediaStorageError> {
        Ok(Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            tokens: Arc::new(DieselAuthTokenRepository::new(pool.clone())),
            ingredients: Arc::new(DieselIngredientRepository::new(pool.clone())),
            recipes: Arc::new(DieselRecipeRepository::new(pool.clone())),
            relations: Arc::new(DieselRecipeRelationRepository::new(pool.clone())),
            subscriptions: Arc::new(DieselSubscriptionRepository::new(pool.clone())),
            hasher: Arc::new(Pbkdf2PasswordHasher::default()),
            media: Arc::new(FsMediaStorage::open(media_root)?),
        })
    }
}

/// Build handler state backed by PostgreSQL and the media directory.
///
/// # Errors
/// Fails when the media root cannot be created or opened.
pub fn build_http_state(
    pool: &DbPool,
    urls: PublicUrls,
    media_root: &Path,
) -> Result<HttpState, MediaStorageError> {
    let adapters = Adapters::new(pool, media_root)?;

    let login = Arc::new(TokenLoginService::new(
        adapters.users.clone(),
        adapters.tokens.clone(),
        adapters.hasher.clone(),
    ));
    let users = Arc::new(UserService::new(
        adapters.users.clone(),
        adapters.subscriptions.clone(),
        adapters.hasher.clone(),
        adapters.media.clone(),
    ));
    let subscriptions = Arc::new(SubscriptionService::new(
        adapters.users.clone(),
        adapters.subscriptions.clone(),
        adapters.recipes.clone(),
    ));
    let recipes = Arc::new(RecipeService::new(RecipeServicePorts {
        recipes: adapters.recipes.clone(),
        ingredients: adapters.ingredients.clone(),
        relations: adapters.relations.clone(),
        users: adapters.users.clone(),
        subscriptions: adapters.subscriptions.clone(),
        media: adapters.media.clone(),
        clock: Arc::new(DefaultClock),
        urls: urls.clone(),
    }));
    let relations = Arc::new(RecipeRelationService::new(
        adapters.recipes.clone(),
        adapters.relations.clone(),
    ));
    let ingredients = Arc::new(IngredientService::new(adapters.ingredients.clone()));

    Ok(HttpState::new(
        HttpStatePorts {
            login,
            users: users.clone(),
            accounts: users,
            subscriptions: subscriptions.clone(),
            subscriptions_query: subscriptions,
            recipes: recipes.clone(),
            recipes_query: recipes,
            relations: relations.clone(),
            shopping_list: relations,
            ingredients,
        },
        urls,
    ))
}
