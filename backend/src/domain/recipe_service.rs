//! Recipe service implementing [`RecipesCommand`] and [`RecipesQuery`].
//!
//! Writes follow one sequence: check authorship for updates, validate the
//! payload and the ingredient set against the catalog, store the image, then hand the aggregate to the repository,
//! which persists it in a single transaction. A failed write discards the
//! image that was stored for it.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::PageRequest;
use tracing::{info, warn};

use super::error_mapping::{
    field_error, map_ingredient_repository_error, map_media_error, map_recipe_repository_error,
    map_relation_repository_error,
};
use super::ports::{
    IngredientRepository, Listing, MediaStorage, NewRecipeRecord, RecipeFlags,
    RecipeRelationRepository, RecipeRepository, RecipeUpdateRecord, RecipesCommand, RecipesQuery,
    SubscriptionRepository, UserRepository,
};
use super::profiles::ProfileDirectory;
use super::{
    Error, IngredientId, IngredientSet, PublicUrls, Recipe, RecipeChanges, RecipeDraft,
    RecipeFilter, RecipeId, RecipeInput, RecipeValidationError, RecipeView, UserId,
};

/// Media folder for recipe images.
pub const RECIPE_MEDIA_FOLDER: &str = "recipes";

/// Collaborators required by [`RecipeService`].
#[derive(Clone)]
pub struct RecipeServicePorts {
    /// Recipe aggregate storage.
    pub recipes: Arc<dyn RecipeRepository>,
    /// Catalog used to resolve ingredient keys.
    pub ingredients: Arc<dyn IngredientRepository>,
    /// Favorite and cart rows for viewer flags.
    pub relations: Arc<dyn RecipeRelationRepository>,
    /// Author lookups.
    pub users: Arc<dyn UserRepository>,
    /// Follower rows for the author's `is_subscribed` flag.
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    /// Image storage.
    pub media: Arc<dyn MediaStorage>,
    /// Source of creation timestamps.
    pub clock: Arc<dyn Clock>,
    /// Short link builder.
    pub urls: PublicUrls,
}

/// Recipe reads and writes.
#[derive(Clone)]
pub struct RecipeService {
    recipes: Arc<dyn RecipeRepository>,
    ingredients: Arc<dyn IngredientRepository>,
    relations: Arc<dyn RecipeRelationRepository>,
    profiles: ProfileDirectory,
    media: Arc<dyn MediaStorage>,
    clock: Arc<dyn Clock>,
    urls: PublicUrls,
}

impl RecipeService {
    /// Create a service from its collaborators.
    pub fn new(ports: RecipeServicePorts) -> Self {
        Self {
            recipes: ports.recipes,
            ingredients: ports.ingredients,
            relations: ports.relations,
            profiles: ProfileDirectory::new(ports.users, ports.subscriptions),
            media: ports.media,
            clock: ports.clock,
            urls: ports.urls,
        }
    }

    async fn ensure_ingredients_exist(&self, set: &IngredientSet) -> Result<(), Error> {
        let requested = set.ingredient_ids();
        let known: HashSet<IngredientId> = self
            .ingredients
            .find_many(&requested)
            .await
            .map_err(map_ingredient_repository_error)?
            .into_iter()
            .map(|ingredient| ingredient.id)
            .collect();
        let missing: Vec<IngredientId> = requested
            .into_iter()
            .filter(|id| !known.contains(id))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(recipe_validation_error(
            &RecipeValidationError::UnknownIngredients {
                ingredient_ids: missing,
            },
        ))
    }

    async fn find_existing(&self, id: RecipeId) -> Result<Recipe, Error> {
        self.recipes
            .find(id)
            .await
            .map_err(map_recipe_repository_error)?
            .ok_or_else(|| Error::not_found(format!("recipe {id} not found")))
    }

    async fn find_owned(&self, caller: &UserId, id: RecipeId) -> Result<Recipe, Error> {
        let recipe = self.find_existing(id).await?;
        if recipe.author != *caller {
            return Err(Error::forbidden(
                "only the author may change or delete this recipe",
            ));
        }
        Ok(recipe)
    }

    async fn discard_image(&self, path: &str) {
        if let Err(error) = self.media.delete(path).await {
            warn!(%path, %error, "failed to discard recipe image");
        }
    }

    async fn assemble(
        &self,
        viewer: Option<&UserId>,
        recipes: Vec<Recipe>,
    ) -> Result<Vec<RecipeView>, Error> {
        if recipes.is_empty() {
            return Ok(Vec::new());
        }
        let authors: Vec<UserId> = recipes.iter().map(|recipe| recipe.author.clone()).collect();
        let profiles = self.profiles.profiles_by_id(viewer, &authors).await?;
        let flags: HashMap<RecipeId, RecipeFlags> = match viewer {
            Some(viewer) => {
                let ids: Vec<RecipeId> = recipes.iter().map(|recipe| recipe.id).collect();
                self.relations
                    .flags(viewer, &ids)
                    .await
                    .map_err(map_relation_repository_error)?
                    .into_iter()
                    .map(|flag| (flag.recipe_id, flag))
                    .collect()
            }
            None => HashMap::new(),
        };
        recipes
            .into_iter()
            .map(|recipe| {
                let author = profiles.get(&recipe.author).cloned().ok_or_else(|| {
                    Error::internal(format!("author of recipe {} is missing", recipe.id))
                })?;
                let flag = flags.get(&recipe.id);
                Ok(RecipeView {
                    author,
                    is_favorited: flag.is_some_and(|f| f.is_favorited),
                    is_in_shopping_cart: flag.is_some_and(|f| f.is_in_shopping_cart),
                    recipe,
                })
            })
            .collect()
    }

    async fn assemble_one(
        &self,
        viewer: Option<&UserId>,
        recipe: Recipe,
    ) -> Result<RecipeView, Error> {
        self.assemble(viewer, vec![recipe])
            .await?
            .pop()
            .ok_or_else(|| Error::internal("recipe view assembly returned no rows"))
    }
}

/// Map a recipe payload validation failure onto an API error.
pub(crate) fn recipe_validation_error(error: &RecipeValidationError) -> Error {
    let err = field_error(error.field(), error.code(), error.to_string());
    match error {
        RecipeValidationError::UnknownIngredients { ingredient_ids } => {
            let ids: Vec<i64> = ingredient_ids.iter().map(|id| id.get()).collect();
            err.with_details(serde_json::json!({
                "field": error.field(),
                "code": error.code(),
                "ingredientIds": ids,
            }))
        }
        _ => err,
    }
}

#[async_trait]
impl RecipesCommand for RecipeService {
    async fn create(&self, author: &UserId, draft: RecipeDraft) -> Result<RecipeView, Error> {
        self.ensure_ingredients_exist(&draft.ingredients).await?;
        let image = self
            .media
            .save(RECIPE_MEDIA_FOLDER, &draft.image)
            .await
            .map_err(map_media_error)?;
        let record = NewRecipeRecord {
            author: author.clone(),
            name: draft.name.as_ref().to_owned(),
            text: draft.text.as_ref().to_owned(),
            image: image.clone(),
            cooking_time: draft.cooking_time.get(),
            ingredients: draft.ingredients.into_lines(),
            created_at: self.clock.utc(),
        };
        let recipe = match self.recipes.create(&record).await {
            Ok(recipe) => recipe,
            Err(error) => {
                self.discard_image(&image).await;
                return Err(map_recipe_repository_error(error));
            }
        };
        info!(recipe_id = %recipe.id, author = %author, "recipe created");
        self.assemble_one(Some(author), recipe).await
    }

    async fn update(
        &self,
        caller: &UserId,
        id: RecipeId,
        input: RecipeInput,
    ) -> Result<RecipeView, Error> {
        let existing = self.find_owned(caller, id).await?;
        let changes =
            RecipeChanges::try_from_input(input).map_err(|err| recipe_validation_error(&err))?;
        self.ensure_ingredients_exist(&changes.ingredients).await?;
        let new_image = match changes.image.as_ref() {
            Some(image) => Some(
                self.media
                    .save(RECIPE_MEDIA_FOLDER, image)
                    .await
                    .map_err(map_media_error)?,
            ),
            None => None,
        };
        let record = RecipeUpdateRecord {
            name: changes.name.map(|name| name.as_ref().to_owned()),
            text: changes.text.map(|text| text.as_ref().to_owned()),
            image: new_image.clone(),
            cooking_time: changes.cooking_time.map(|time| time.get()),
            ingredients: changes.ingredients.into_lines(),
        };
        let outcome = match self.recipes.update(id, &record).await {
            Ok(Some(recipe)) => Ok(recipe),
            Ok(None) => Err(Error::not_found(format!("recipe {id} not found"))),
            Err(error) => Err(map_recipe_repository_error(error)),
        };
        let updated = match outcome {
            Ok(recipe) => recipe,
            Err(error) => {
                if let Some(path) = new_image.as_deref() {
                    self.discard_image(path).await;
                }
                return Err(error);
            }
        };
        if new_image.is_some() {
            self.discard_image(&existing.image).await;
        }
        info!(recipe_id = %id, "recipe updated");
        self.assemble_one(Some(caller), updated).await
    }

    async fn delete(&self, caller: &UserId, id: RecipeId) -> Result<(), Error> {
        let existing = self.find_owned(caller, id).await?;
        let removed = self
            .recipes
            .delete(id)
            .await
            .map_err(map_recipe_repository_error)?;
        if !removed {
            return Err(Error::not_found(format!("recipe {id} not found")));
        }
        self.discard_image(&existing.image).await;
        info!(recipe_id = %id, "recipe deleted");
        Ok(())
    }
}

#[async_trait]
impl RecipesQuery for RecipeService {
    async fn list(
        &self,
        filter: RecipeFilter,
        page: PageRequest,
    ) -> Result<Listing<RecipeView>, Error> {
        let viewer = filter.viewer.clone();
        let filter = filter.scoped_to(viewer.clone());
        let listing = self
            .recipes
            .list(&filter, page)
            .await
            .map_err(map_recipe_repository_error)?;
        let items = self.assemble(viewer.as_ref(), listing.items).await?;
        Ok(Listing::new(items, listing.total))
    }

    async fn get(&self, viewer: Option<UserId>, id: RecipeId) -> Result<RecipeView, Error> {
        let recipe = self.find_existing(id).await?;
        self.assemble_one(viewer.as_ref(), recipe).await
    }

    async fn short_link(&self, id: RecipeId) -> Result<String, Error> {
        self.find_existing(id).await?;
        Ok(self.urls.short_link())
    }
}

#[cfg(test)]
#[path = "recipe_service_tests.rs"]
mod tests;
