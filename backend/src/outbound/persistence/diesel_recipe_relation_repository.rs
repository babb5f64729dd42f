//! PostgreSQL-backed favorites and shopping cart.
//!
//! Both relations share one adapter: the tables have the same shape and the
//! port selects between them with [`RelationKind`].

use std::collections::HashSet;

use async_trait::async_trait;
use diesel::dsl::{count_star, sum};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{RecipeFlags, RecipeRelationRepository, RecipeRelationRepositoryError};
use crate::domain::{IngredientTotal, RecipeId, RelationKind, UserId};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::diesel_user_repository::count_to_total;
use super::models::{NewCartRow, NewFavoriteRow};
use super::pool::{DbPool, PoolError};
use super::schema::{favorites, ingredients, recipe_ingredients, shopping_cart};

/// Diesel-backed implementation of the `RecipeRelationRepository` port.
#[derive(Clone)]
pub struct DieselRecipeRelationRepository {
    pool: DbPool,
}

impl DieselRecipeRelationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RecipeRelationRepositoryError {
    RecipeRelationRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> RecipeRelationRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => RecipeRelationRepositoryError::connection(message),
        DieselFailure::Query(message) => RecipeRelationRepositoryError::query(message),
        DieselFailure::UniqueViolation { constraint } => RecipeRelationRepositoryError::duplicate(
            constraint.unwrap_or_else(|| "relation".to_owned()),
        ),
        DieselFailure::ForeignKeyViolation { constraint } => {
            RecipeRelationRepositoryError::missing_recipe(
                constraint.unwrap_or_else(|| "recipe".to_owned()),
            )
        }
        DieselFailure::CheckViolation { .. } => {
            RecipeRelationRepositoryError::query("database constraint violated")
        }
    }
}

/// Convert a summed amount into the domain total.
#[expect(clippy::cast_sign_loss, reason = "amounts are constrained to be positive")]
fn sum_to_amount(total: Option<i64>) -> u64 {
    total.unwrap_or(0).max(0) as u64
}

fn flags_for(
    recipes: &[RecipeId],
    favorited: &HashSet<i64>,
    in_cart: &HashSet<i64>,
) -> Vec<RecipeFlags> {
    recipes
        .iter()
        .map(|id| RecipeFlags {
            recipe_id: *id,
            is_favorited: favorited.contains(&id.get()),
            is_in_shopping_cart: in_cart.contains(&id.get()),
        })
        .collect()
}

#[async_trait]
impl RecipeRelationRepository for DieselRecipeRelationRepository {
    async fn add(
        &self,
        kind: RelationKind,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<(), RecipeRelationRepositoryError> {
        let user_id = *user.as_uuid();
        let recipe_id = recipe.get();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        match kind {
            RelationKind::Favorite => diesel::insert_into(favorites::table)
                .values(&NewFavoriteRow { user_id, recipe_id })
                .execute(&mut conn)
                .await,
            RelationKind::ShoppingCart => diesel::insert_into(shopping_cart::table)
                .values(&NewCartRow { user_id, recipe_id })
                .execute(&mut conn)
                .await,
        }
        .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn remove(
        &self,
        kind: RelationKind,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<bool, RecipeRelationRepositoryError> {
        let user_id = *user.as_uuid();
        let recipe_id = recipe.get();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = match kind {
            RelationKind::Favorite => {
                diesel::delete(
                    favorites::table
                        .filter(favorites::user_id.eq(user_id))
                        .filter(favorites::recipe_id.eq(recipe_id)),
                )
                .execute(&mut conn)
                .await
            }
            RelationKind::ShoppingCart => {
                diesel::delete(
                    shopping_cart::table
                        .filter(shopping_cart::user_id.eq(user_id))
                        .filter(shopping_cart::recipe_id.eq(recipe_id)),
                )
                .execute(&mut conn)
                .await
            }
        }
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn flags(
        &self,
        user: &UserId,
        recipes: &[RecipeId],
    ) -> Result<Vec<RecipeFlags>, RecipeRelationRepositoryError> {
        if recipes.is_empty() {
            return Ok(Vec::new());
        }
        let user_id: Uuid = *user.as_uuid();
        let ids: Vec<i64> = recipes.iter().map(|id| id.get()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let favorited: Vec<i64> = favorites::table
            .filter(favorites::user_id.eq(user_id))
            .filter(favorites::recipe_id.eq_any(&ids))
            .select(favorites::recipe_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let in_cart: Vec<i64> = shopping_cart::table
            .filter(shopping_cart::user_id.eq(user_id))
            .filter(shopping_cart::recipe_id.eq_any(&ids))
            .select(shopping_cart::recipe_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(flags_for(
            recipes,
            &favorited.into_iter().collect(),
            &in_cart.into_iter().collect(),
        ))
    }

    async fn cart_size(&self, user: &UserId) -> Result<u64, RecipeRelationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = shopping_cart::table
            .filter(shopping_cart::user_id.eq(user.as_uuid()))
            .select(count_star())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count_to_total(total))
    }

    async fn cart_totals(
        &self,
        user: &UserId,
    ) -> Result<Vec<IngredientTotal>, RecipeRelationRepositoryError> {
        let cart = shopping_cart::table
            .filter(shopping_cart::user_id.eq(*user.as_uuid()))
            .select(shopping_cart::recipe_id);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(String, String, Option<i64>)> = recipe_ingredients::table
            .inner_join(ingredients::table)
            .filter(recipe_ingredients::recipe_id.eq_any(cart))
            .group_by((ingredients::name, ingredients::measurement_unit))
            .select((
                ingredients::name,
                ingredients::measurement_unit,
                sum(recipe_ingredients::amount),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(name, measurement_unit, total)| IngredientTotal {
                name,
                measurement_unit,
                amount: sum_to_amount(total),
            })
            .collect())
    }
}
