//! PostgreSQL-backed `RecipeRepository` implementation using Diesel ORM.
//!
//! A recipe header and its ingredient lines are written inside one
//! transaction. Reads load headers first and then the lines for the whole
//! page in a single joined query, ordered by ingredient name.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::dsl::{count_star, not};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use pagination::PageRequest;
use tracing::debug;

use crate::domain::ports::{
    Listing, NewRecipeRecord, RecipeRepository, RecipeRepositoryError, RecipeUpdateRecord,
};
use crate::domain::{
    IngredientLine, Recipe, RecipeFilter, RecipeId, RecipeIngredient, RecipeSummary, UserId,
};

use super::diesel_error_mapping::{
    DieselFailure, classify_diesel_error, constraint_mentions, pool_error_message,
};
use super::diesel_ingredient_repository::row_to_ingredient;
use super::diesel_user_repository::{count_to_total, page_bounds};
use super::models::{
    IngredientRow, NewRecipeIngredientRow, NewRecipeRow, RecipeRow, RecipeUpdate,
};
use super::pool::{DbPool, PoolError};
use super::schema::{favorites, ingredients, recipe_ingredients, recipes, shopping_cart};

/// Ingredient line joined with its catalog row: `(recipe_id, amount, ingredient)`.
type LineRow = (i64, i32, IngredientRow);

/// Diesel-backed implementation of the `RecipeRepository` port.
#[derive(Clone)]
pub struct DieselRecipeRepository {
    pool: DbPool,
}

impl DieselRecipeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RecipeRepositoryError {
    RecipeRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> RecipeRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => RecipeRepositoryError::connection(message),
        DieselFailure::ForeignKeyViolation { constraint }
            if constraint_mentions(constraint.as_deref(), "ingredient_id") =>
        {
            RecipeRepositoryError::unknown_ingredient("ingredient reference rejected")
        }
        DieselFailure::Query(message) => RecipeRepositoryError::query(message),
        DieselFailure::UniqueViolation { .. }
        | DieselFailure::ForeignKeyViolation { .. }
        | DieselFailure::CheckViolation { .. } => {
            RecipeRepositoryError::query("database constraint violated")
        }
    }
}

fn to_db_int(value: u32, what: &str) -> Result<i32, RecipeRepositoryError> {
    i32::try_from(value)
        .map_err(|_| RecipeRepositoryError::query(format!("{what} {value} exceeds storage range")))
}

fn from_db_int(value: i32, what: &str) -> Result<u32, RecipeRepositoryError> {
    u32::try_from(value)
        .map_err(|_| RecipeRepositoryError::query(format!("stored {what} {value} is negative")))
}

fn line_rows(
    recipe_id: i64,
    lines: &[IngredientLine],
) -> Result<Vec<NewRecipeIngredientRow>, RecipeRepositoryError> {
    lines
        .iter()
        .map(|line| {
            Ok(NewRecipeIngredientRow {
                recipe_id,
                ingredient_id: line.ingredient_id.get(),
                amount: to_db_int(line.amount, "amount")?,
            })
        })
        .collect()
}

/// Attach loaded ingredient lines to their headers, preserving header order.
fn assemble(headers: Vec<RecipeRow>, lines: Vec<LineRow>) -> Result<Vec<Recipe>, RecipeRepositoryError> {
    let mut by_recipe: HashMap<i64, Vec<RecipeIngredient>> = HashMap::new();
    for (recipe_id, amount, ingredient) in lines {
        by_recipe.entry(recipe_id).or_default().push(RecipeIngredient {
            ingredient: row_to_ingredient(ingredient),
            amount: from_db_int(amount, "amount")?,
        });
    }
    headers
        .into_iter()
        .map(|row| {
            Ok(Recipe {
                id: RecipeId::new(row.id),
                author: UserId::from_uuid(row.author_id),
                name: row.name,
                text: row.text,
                image: row.image,
                cooking_time: from_db_int(row.cooking_time, "cooking_time")?,
                ingredients: by_recipe.remove(&row.id).unwrap_or_default(),
                created_at: row.created_at,
            })
        })
        .collect()
}

async fn load_lines(
    conn: &mut AsyncPgConnection,
    recipe_ids: &[i64],
) -> Result<Vec<LineRow>, diesel::result::Error> {
    if recipe_ids.is_empty() {
        return Ok(Vec::new());
    }
    recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(recipe_ids))
        .order((ingredients::name.asc(), ingredients::id.asc()))
        .select((
            recipe_ingredients::recipe_id,
            recipe_ingredients::amount,
            IngredientRow::as_select(),
        ))
        .load(conn)
        .await
}

/// Build the filtered header query; called once for the page and once for
/// the count because boxed queries are not `Clone`.
fn filtered(filter: &RecipeFilter) -> recipes::BoxedQuery<'static, Pg> {
    let mut query = recipes::table.into_boxed();
    if let Some(author) = &filter.author {
        query = query.filter(recipes::author_id.eq(*author.as_uuid()));
    }
    let Some(viewer) = filter.viewer.as_ref().map(|id| *id.as_uuid()) else {
        return query;
    };
    if let Some(wanted) = filter.is_favorited {
        let favorited = favorites::table
            .filter(favorites::user_id.eq(viewer))
            .select(favorites::recipe_id);
        query = if wanted {
            query.filter(recipes::id.eq_any(favorited))
        } else {
            query.filter(not(recipes::id.eq_any(favorited)))
        };
    }
    if let Some(wanted) = filter.is_in_shopping_cart {
        let in_cart = shopping_cart::table
            .filter(shopping_cart::user_id.eq(viewer))
            .select(shopping_cart::recipe_id);
        query = if wanted {
            query.filter(recipes::id.eq_any(in_cart))
        } else {
            query.filter(not(recipes::id.eq_any(in_cart)))
        };
    }
    query
}

#[async_trait]
impl RecipeRepository for DieselRecipeRepository {
    async fn create(&self, record: &NewRecipeRecord) -> Result<Recipe, RecipeRepositoryError> {
        let cooking_time = to_db_int(record.cooking_time, "cooking_time")?;
        let amounts = line_rows(0, &record.ingredients)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let (header, loaded) = conn
            .transaction(|conn| {
                async move {
                    let header: RecipeRow = diesel::insert_into(recipes::table)
                        .values(&NewRecipeRow {
                            author_id: *record.author.as_uuid(),
                            name: record.name.as_str(),
                            text: record.text.as_str(),
                            image: record.image.as_str(),
                            cooking_time,
                            created_at: record.created_at,
                        })
                        .returning(RecipeRow::as_returning())
                        .get_result(conn)
                        .await?;
                    let rows: Vec<NewRecipeIngredientRow> = amounts
                        .into_iter()
                        .map(|row| NewRecipeIngredientRow {
                            recipe_id: header.id,
                            ..row
                        })
                        .collect();
                    diesel::insert_into(recipe_ingredients::table)
                        .values(&rows)
                        .execute(conn)
                        .await?;
                    let loaded = load_lines(conn, &[header.id]).await?;
                    Ok((header, loaded))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        debug!(recipe_id = header.id, "recipe inserted");
        assemble(vec![header], loaded)?
            .pop()
            .ok_or_else(|| RecipeRepositoryError::query("inserted recipe vanished"))
    }

    async fn update(
        &self,
        id: RecipeId,
        changes: &RecipeUpdateRecord,
    ) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let cooking_time = changes
            .cooking_time
            .map(|minutes| to_db_int(minutes, "cooking_time"))
            .transpose()?;
        let rows = line_rows(id.get(), &changes.ingredients)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let outcome = conn
            .transaction(|conn| {
                async move {
                    let existing: Option<i64> = recipes::table
                        .filter(recipes::id.eq(id.get()))
                        .select(recipes::id)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    if existing.is_none() {
                        return Ok(None);
                    }
                    let update = RecipeUpdate {
                        name: changes.name.as_deref(),
                        text: changes.text.as_deref(),
                        image: changes.image.as_deref(),
                        cooking_time,
                    };
                    if !update.is_empty() {
                        diesel::update(recipes::table.filter(recipes::id.eq(id.get())))
                            .set(&update)
                            .execute(conn)
                            .await?;
                    }
                    diesel::delete(
                        recipe_ingredients::table
                            .filter(recipe_ingredients::recipe_id.eq(id.get())),
                    )
                    .execute(conn)
                    .await?;
                    diesel::insert_into(recipe_ingredients::table)
                        .values(&rows)
                        .execute(conn)
                        .await?;
                    let header: RecipeRow = recipes::table
                        .filter(recipes::id.eq(id.get()))
                        .select(RecipeRow::as_select())
                        .first(conn)
                        .await?;
                    let loaded = load_lines(conn, &[header.id]).await?;
                    Ok(Some((header, loaded)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let Some((header, loaded)) = outcome else {
            return Ok(None);
        };
        debug!(recipe_id = header.id, "recipe updated");
        Ok(assemble(vec![header], loaded)?.pop())
    }

    async fn delete(&self, id: RecipeId) -> Result<bool, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = conn
            .transaction(|conn| {
                async move {
                    let key = id.get();
                    diesel::delete(favorites::table.filter(favorites::recipe_id.eq(key)))
                        .execute(conn)
                        .await?;
                    diesel::delete(shopping_cart::table.filter(shopping_cart::recipe_id.eq(key)))
                        .execute(conn)
                        .await?;
                    diesel::delete(
                        recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(key)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(recipes::table.filter(recipes::id.eq(key)))
                        .execute(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn find(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let header: Option<RecipeRow> = recipes::table
            .filter(recipes::id.eq(id.get()))
            .select(RecipeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(header) = header else {
            return Ok(None);
        };
        let loaded = load_lines(&mut conn, &[header.id])
            .await
            .map_err(map_diesel_error)?;
        Ok(assemble(vec![header], loaded)?.pop())
    }

    async fn list(
        &self,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> Result<Listing<Recipe>, RecipeRepositoryError> {
        let (limit, offset) = page_bounds(page);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = filtered(filter)
            .select(count_star())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let headers: Vec<RecipeRow> = filtered(filter)
            .order((recipes::created_at.desc(), recipes::id.desc()))
            .limit(limit)
            .offset(offset)
            .select(RecipeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let ids: Vec<i64> = headers.iter().map(|row| row.id).collect();
        let loaded = load_lines(&mut conn, &ids)
            .await
            .map_err(map_diesel_error)?;
        Ok(Listing::new(
            assemble(headers, loaded)?,
            count_to_total(total),
        ))
    }

    async fn summaries_by_author(
        &self,
        author: &UserId,
        limit: Option<usize>,
    ) -> Result<Vec<RecipeSummary>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = recipes::table
            .filter(recipes::author_id.eq(*author.as_uuid()))
            .order((recipes::created_at.desc(), recipes::id.desc()))
            .select((
                recipes::id,
                recipes::name,
                recipes::image,
                recipes::cooking_time,
            ))
            .into_boxed();
        if let Some(cap) = limit {
            query = query.limit(i64::try_from(cap).unwrap_or(i64::MAX));
        }
        let rows: Vec<(i64, String, String, i32)> =
            query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|(id, name, image, cooking_time)| {
                Ok(RecipeSummary {
                    id: RecipeId::new(id),
                    name,
                    image,
                    cooking_time: from_db_int(cooking_time, "cooking_time")?,
                })
            })
            .collect()
    }

    async fn count_by_author(&self, author: &UserId) -> Result<u64, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = recipes::table
            .filter(recipes::author_id.eq(*author.as_uuid()))
            .select(count_star())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count_to_total(total))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::IngredientId;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use uuid::Uuid;

    fn header(id: i64) -> RecipeRow {
        RecipeRow {
            id,
            author_id: Uuid::new_v4(),
            name: format!("Recipe {id}"),
            text: "Stir.".to_owned(),
            image: "recipes/r.png".to_owned(),
            cooking_time: 15,
            created_at: Utc
                .with_ymd_and_hms(2026, 1, 5, 9, 0, 0)
                .single()
                .expect("valid timestamp"),
        }
    }

    fn line(recipe_id: i64, ingredient_id: i64, name: &str, amount: i32) -> LineRow {
        (
            recipe_id,
            amount,
            IngredientRow {
                id: ingredient_id,
                name: name.to_owned(),
                measurement_unit: "g".to_owned(),
            },
        )
    }

    #[rstest]
    fn lines_are_grouped_under_their_headers() {
        let recipes = assemble(
            vec![header(2), header(1)],
            vec![
                line(1, 10, "Flour", 200),
                line(2, 11, "Salt", 5),
                line(1, 12, "Sugar", 50),
            ],
        )
        .expect("assemble");

        assert_eq!(recipes[0].id, RecipeId::new(2));
        assert_eq!(recipes[0].ingredients.len(), 1);
        assert_eq!(recipes[1].ingredients.len(), 2);
        assert_eq!(recipes[1].ingredients[1].amount, 50);
        assert_eq!(recipes[1].cooking_time, 15);
    }

    #[rstest]
    fn negative_stored_amounts_are_query_errors() {
        let err = assemble(vec![header(1)], vec![line(1, 10, "Flour", -1)])
            .expect_err("negative amount");
        assert!(matches!(err, RecipeRepositoryError::Query { .. }));
    }

    #[rstest]
    fn line_rows_carry_the_recipe_key() {
        let rows = line_rows(
            9,
            &[IngredientLine {
                ingredient_id: IngredientId::new(3),
                amount: 120,
            }],
        )
        .expect("rows");
        assert_eq!(rows[0].recipe_id, 9);
        assert_eq!(rows[0].ingredient_id, 3);
        assert_eq!(rows[0].amount, 120);
    }

    #[rstest]
    fn oversized_values_are_rejected_before_the_database() {
        assert!(to_db_int(u32::MAX, "amount").is_err());
    }
}
