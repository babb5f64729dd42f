//! Ingredient catalog service implementing [`IngredientsQuery`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::error_mapping::map_ingredient_repository_error;
use super::ports::{IngredientRepository, IngredientsQuery};
use super::{Error, Ingredient, IngredientId, IngredientImportOutcome, NewIngredient};

/// Catalog reads plus the bulk import used by the loader binary.
#[derive(Clone)]
pub struct IngredientService {
    repo: Arc<dyn IngredientRepository>,
}

impl IngredientService {
    /// Create a service over the catalog repository.
    pub fn new(repo: Arc<dyn IngredientRepository>) -> Self {
        Self { repo }
    }

    /// Insert catalog pairs that are not present yet.
    pub async fn import(
        &self,
        ingredients: &[NewIngredient],
    ) -> Result<IngredientImportOutcome, Error> {
        let outcome = self
            .repo
            .import(ingredients)
            .await
            .map_err(map_ingredient_repository_error)?;
        info!(
            inserted = outcome.inserted,
            skipped = outcome.skipped,
            "ingredient import finished"
        );
        Ok(outcome)
    }
}

#[async_trait]
impl IngredientsQuery for IngredientService {
    async fn search(&self, name: Option<String>) -> Result<Vec<Ingredient>, Error> {
        let prefix = name.as_deref().map(str::trim).unwrap_or_default();
        self.repo
            .search(prefix)
            .await
            .map_err(map_ingredient_repository_error)
    }

    async fn get(&self, id: IngredientId) -> Result<Ingredient, Error> {
        self.repo
            .find(id)
            .await
            .map_err(map_ingredient_repository_error)?
            .ok_or_else(|| Error::not_found(format!("ingredient {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{IngredientRepositoryError, MockIngredientRepository};
    use mockall::predicate::eq;
    use rstest::rstest;

    fn sugar() -> Ingredient {
        Ingredient {
            id: IngredientId::new(1),
            name: "Sugar".to_owned(),
            measurement_unit: "g".to_owned(),
        }
    }

    #[rstest]
    #[case(None, "")]
    #[case(Some("  su "), "su")]
    #[tokio::test]
    async fn search_passes_a_trimmed_prefix(#[case] name: Option<&str>, #[case] expected: &str) {
        let mut repo = MockIngredientRepository::new();
        let expected = expected.to_owned();
        repo.expect_search()
            .withf(move |prefix| prefix == expected.as_str())
            .times(1)
            .return_once(|_| Ok(vec![sugar()]));
        let service = IngredientService::new(Arc::new(repo));

        let found = service
            .search(name.map(str::to_owned))
            .await
            .expect("search succeeds");
        assert_eq!(found, vec![sugar()]);
    }

    #[rstest]
    #[tokio::test]
    async fn get_reports_missing_ingredients() {
        let mut repo = MockIngredientRepository::new();
        repo.expect_find()
            .with(eq(IngredientId::new(9)))
            .return_once(|_| Ok(None));
        let service = IngredientService::new(Arc::new(repo));

        let err = service.get(IngredientId::new(9)).await.expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn storage_outages_are_unavailable() {
        let mut repo = MockIngredientRepository::new();
        repo.expect_search()
            .return_once(|_| Err(IngredientRepositoryError::connection("pool timed out")));
        let service = IngredientService::new(Arc::new(repo));

        let err = service.search(None).await.expect_err("outage");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
