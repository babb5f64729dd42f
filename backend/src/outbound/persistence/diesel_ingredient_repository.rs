//! PostgreSQL-backed `IngredientRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{IngredientRepository, IngredientRepositoryError};
use crate::domain::{Ingredient, IngredientId, IngredientImportOutcome, NewIngredient};

use super::diesel_error_mapping::{map_basic_diesel_error, pool_error_message};
use super::models::{IngredientRow, NewIngredientRow};
use super::pool::{DbPool, PoolError};
use super::schema::ingredients;

/// Rows per import statement; two bind parameters each keep well under the
/// PostgreSQL parameter limit.
const IMPORT_CHUNK: usize = 1000;

/// Diesel-backed implementation of the ingredient catalog.
#[derive(Clone)]
pub struct DieselIngredientRepository {
    pool: DbPool,
}

impl DieselIngredientRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> IngredientRepositoryError {
    IngredientRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> IngredientRepositoryError {
    map_basic_diesel_error(
        error,
        IngredientRepositoryError::query,
        IngredientRepositoryError::connection,
    )
}

/// Convert a catalog row to the domain type.
pub(super) fn row_to_ingredient(row: IngredientRow) -> Ingredient {
    Ingredient {
        id: IngredientId::new(row.id),
        name: row.name,
        measurement_unit: row.measurement_unit,
    }
}

/// Escape `LIKE` metacharacters so a prefix matches literally.
fn like_prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for ch in prefix.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl IngredientRepository for DieselIngredientRepository {
    async fn search(
        &self,
        name_prefix: &str,
    ) -> Result<Vec<Ingredient>, IngredientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<IngredientRow> = ingredients::table
            .filter(ingredients::name.ilike(like_prefix_pattern(name_prefix)))
            .order((ingredients::name.asc(), ingredients::id.asc()))
            .select(IngredientRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_ingredient).collect())
    }

    async fn find(&self, id: IngredientId) -> Result<Option<Ingredient>, IngredientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<IngredientRow> = ingredients::table
            .filter(ingredients::id.eq(id.get()))
            .select(IngredientRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_ingredient))
    }

    async fn find_many(
        &self,
        ids: &[IngredientId],
    ) -> Result<Vec<Ingredient>, IngredientRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<IngredientRow> = ingredients::table
            .filter(ingredients::id.eq_any(raw))
            .select(IngredientRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_ingredient).collect())
    }

    async fn import(
        &self,
        records: &[NewIngredient],
    ) -> Result<IngredientImportOutcome, IngredientRepositoryError> {
        if records.is_empty() {
            return Ok(IngredientImportOutcome::default());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut inserted = 0;
        for chunk in records.chunks(IMPORT_CHUNK) {
            let rows: Vec<NewIngredientRow<'_>> = chunk
                .iter()
                .map(|record| NewIngredientRow {
                    name: record.name(),
                    measurement_unit: record.measurement_unit(),
                })
                .collect();
            inserted += diesel::insert_into(ingredients::table)
                .values(&rows)
                .on_conflict((ingredients::name, ingredients::measurement_unit))
                .do_nothing()
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
        }
        debug!(inserted, total = records.len(), "ingredient import written");
        Ok(IngredientImportOutcome {
            inserted,
            skipped: records.len().saturating_sub(inserted),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("sug", "sug%")]
    #[case("", "%")]
    #[case("50%_off", "50\\%\\_off%")]
    #[case("a\\b", "a\\\\b%")]
    fn prefix_patterns_escape_wildcards(#[case] prefix: &str, #[case] expected: &str) {
        assert_eq!(like_prefix_pattern(prefix), expected);
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(err, IngredientRepositoryError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn diesel_error_maps_to_query_error() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, IngredientRepositoryError::Query { .. }));
    }

    #[rstest]
    fn rows_convert_to_catalog_entries() {
        let ingredient = row_to_ingredient(IngredientRow {
            id: 4,
            name: "Sugar".to_owned(),
            measurement_unit: "g".to_owned(),
        });
        assert_eq!(ingredient.id, IngredientId::new(4));
        assert_eq!(ingredient.measurement_unit, "g");
    }
}
