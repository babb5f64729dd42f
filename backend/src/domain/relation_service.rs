//! Favorite/cart toggles and the shopping-list download.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::error_mapping::{
    field_error, map_recipe_repository_error, map_relation_repository_error,
};
use super::ports::{
    RecipeRelationRepository, RecipeRelationRepositoryError, RecipeRelationsCommand,
    RecipeRepository, ShoppingListQuery,
};
use super::{Error, Recipe, RecipeId, RecipeSummary, RelationKind, ShoppingList, UserId};

/// Service implementing [`RecipeRelationsCommand`] and [`ShoppingListQuery`].
#[derive(Clone)]
pub struct RecipeRelationService {
    recipes: Arc<dyn RecipeRepository>,
    relations: Arc<dyn RecipeRelationRepository>,
}

impl RecipeRelationService {
    /// Create a service over recipe and relation storage.
    pub fn new(
        recipes: Arc<dyn RecipeRepository>,
        relations: Arc<dyn RecipeRelationRepository>,
    ) -> Self {
        Self { recipes, relations }
    }

    async fn existing_recipe(&self, id: RecipeId) -> Result<Recipe, Error> {
        self.recipes
            .find(id)
            .await
            .map_err(map_recipe_repository_error)?
            .ok_or_else(|| Error::not_found(format!("recipe {id} not found")))
    }
}

#[async_trait]
impl RecipeRelationsCommand for RecipeRelationService {
    async fn add(
        &self,
        kind: RelationKind,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<RecipeSummary, Error> {
        let existing = self.existing_recipe(recipe).await?;
        self.relations
            .add(kind, user, recipe)
            .await
            .map_err(|error| match error {
                RecipeRelationRepositoryError::Duplicate { .. } => {
                    Error::conflict(kind.duplicate_message())
                }
                other => map_relation_repository_error(other),
            })?;
        debug!(%kind, %user, recipe_id = %recipe, "relation added");
        Ok(existing.summary())
    }

    async fn remove(
        &self,
        kind: RelationKind,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<(), Error> {
        self.existing_recipe(recipe).await?;
        let removed = self
            .relations
            .remove(kind, user, recipe)
            .await
            .map_err(map_relation_repository_error)?;
        if !removed {
            return Err(Error::not_found(kind.missing_message()));
        }
        debug!(%kind, %user, recipe_id = %recipe, "relation removed");
        Ok(())
    }
}

#[async_trait]
impl ShoppingListQuery for RecipeRelationService {
    async fn shopping_list(&self, user: &UserId) -> Result<ShoppingList, Error> {
        let cart_size = self
            .relations
            .cart_size(user)
            .await
            .map_err(map_relation_repository_error)?;
        if cart_size == 0 {
            return Err(empty_cart_error());
        }
        let totals = self
            .relations
            .cart_totals(user)
            .await
            .map_err(map_relation_repository_error)?;
        Ok(ShoppingList::aggregate(totals))
    }
}

fn empty_cart_error() -> Error {
    field_error("shopping_cart", "empty_cart", "shopping cart is empty")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::IngredientTotal;
    use crate::domain::ports::{MockRecipeRelationRepository, MockRecipeRepository};
    use crate::domain::test_fixtures::recipe;
    use rstest::rstest;

    fn service(
        recipes: MockRecipeRepository,
        relations: MockRecipeRelationRepository,
    ) -> RecipeRelationService {
        RecipeRelationService::new(Arc::new(recipes), Arc::new(relations))
    }

    fn recipes_with(id: i64) -> MockRecipeRepository {
        let author = UserId::random();
        let mut recipes = MockRecipeRepository::new();
        recipes
            .expect_find()
            .return_once(move |_| Ok(Some(recipe(id, &author))));
        recipes
    }

    #[rstest]
    #[case(RelationKind::Favorite)]
    #[case(RelationKind::ShoppingCart)]
    #[tokio::test]
    async fn adding_returns_the_recipe_summary(#[case] kind: RelationKind) {
        let mut relations = MockRecipeRelationRepository::new();
        relations
            .expect_add()
            .withf(move |k, _, id| *k == kind && *id == RecipeId::new(3))
            .times(1)
            .return_once(|_, _, _| Ok(()));

        let summary = service(recipes_with(3), relations)
            .add(kind, &UserId::random(), RecipeId::new(3))
            .await
            .expect("add succeeds");
        assert_eq!(summary.id, RecipeId::new(3));
        assert_eq!(summary.cooking_time, 20);
    }

    #[rstest]
    #[case(RelationKind::Favorite, "recipe is already in favorites")]
    #[case(RelationKind::ShoppingCart, "recipe is already in the shopping cart")]
    #[tokio::test]
    async fn duplicate_adds_conflict(#[case] kind: RelationKind, #[case] message: &str) {
        let mut relations = MockRecipeRelationRepository::new();
        relations
            .expect_add()
            .return_once(|_, _, _| Err(RecipeRelationRepositoryError::duplicate("unique")));

        let err = service(recipes_with(3), relations)
            .add(kind, &UserId::random(), RecipeId::new(3))
            .await
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.message(), message);
    }

    #[rstest]
    #[tokio::test]
    async fn removing_an_absent_pair_is_not_found() {
        let mut relations = MockRecipeRelationRepository::new();
        relations.expect_remove().return_once(|_, _, _| Ok(false));

        let err = service(recipes_with(3), relations)
            .remove(RelationKind::Favorite, &UserId::random(), RecipeId::new(3))
            .await
            .expect_err("absent");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), "recipe is not in favorites");
    }

    #[rstest]
    #[tokio::test]
    async fn toggles_on_unknown_recipes_are_not_found() {
        let mut recipes = MockRecipeRepository::new();
        recipes.expect_find().return_once(|_| Ok(None));
        let mut relations = MockRecipeRelationRepository::new();
        relations.expect_add().never();

        let err = service(recipes, relations)
            .add(RelationKind::ShoppingCart, &UserId::random(), RecipeId::new(8))
            .await
            .expect_err("unknown recipe");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn empty_carts_fail_without_aggregating() {
        let mut relations = MockRecipeRelationRepository::new();
        relations.expect_cart_size().return_once(|_| Ok(0));
        relations.expect_cart_totals().never();

        let err = service(MockRecipeRepository::new(), relations)
            .shopping_list(&UserId::random())
            .await
            .expect_err("empty cart");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.details().expect("details")["code"], "empty_cart");
    }

    #[rstest]
    #[tokio::test]
    async fn shared_ingredients_are_summed() {
        let mut relations = MockRecipeRelationRepository::new();
        relations.expect_cart_size().return_once(|_| Ok(2));
        relations.expect_cart_totals().return_once(|_| {
            Ok(vec![
                IngredientTotal {
                    name: "Sugar".to_owned(),
                    measurement_unit: "grams".to_owned(),
                    amount: 100,
                },
                IngredientTotal {
                    name: "Sugar".to_owned(),
                    measurement_unit: "grams".to_owned(),
                    amount: 50,
                },
            ])
        });

        let list = service(MockRecipeRepository::new(), relations)
            .shopping_list(&UserId::random())
            .await
            .expect("shopping list");
        assert!(list.render().contains("Sugar (grams): 150\n"));
    }
}
