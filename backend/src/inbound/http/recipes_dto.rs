//! Request and response payloads for recipe and ingredient endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Ingredient, IngredientLineInput, PublicUrls, RecipeIngredient, RecipeInput, RecipeSummary,
    RecipeView,
};
use crate::inbound::http::users_dto::UserResponse;

/// Catalog ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IngredientResponse {
    #[schema(example = 17)]
    pub id: i64,
    #[schema(example = "Sugar")]
    pub name: String,
    #[schema(example = "g")]
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(value: Ingredient) -> Self {
        Self {
            id: value.id.get(),
            name: value.name,
            measurement_unit: value.measurement_unit,
        }
    }
}

/// Ingredient line inside a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecipeIngredientResponse {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: u32,
}

impl From<RecipeIngredient> for RecipeIngredientResponse {
    fn from(value: RecipeIngredient) -> Self {
        Self {
            id: value.ingredient.id.get(),
            name: value.ingredient.name,
            measurement_unit: value.ingredient.measurement_unit,
            amount: value.amount,
        }
    }
}

/// Full recipe representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecipeResponse {
    pub id: i64,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    /// Absolute image URL.
    pub image: String,
    pub text: String,
    /// Minutes.
    pub cooking_time: u32,
}

impl RecipeResponse {
    /// Render a recipe view with absolute media URLs.
    pub fn from_view(view: RecipeView, urls: &PublicUrls) -> Self {
        let RecipeView {
            recipe,
            author,
            is_favorited,
            is_in_shopping_cart,
        } = view;
        Self {
            id: recipe.id.get(),
            author: UserResponse::from_profile(author, urls),
            ingredients: recipe
                .ingredients
                .into_iter()
                .map(RecipeIngredientResponse::from)
                .collect(),
            is_favorited,
            is_in_shopping_cart,
            name: recipe.name,
            image: urls.media(&recipe.image),
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Short recipe representation used by favorites, the cart and
/// subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecipeSummaryResponse {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: u32,
}

impl RecipeSummaryResponse {
    /// Render a summary with an absolute image URL.
    pub fn from_summary(summary: RecipeSummary, urls: &PublicUrls) -> Self {
        Self {
            id: summary.id.get(),
            name: summary.name,
            image: urls.media(&summary.image),
            cooking_time: summary.cooking_time,
        }
    }
}

/// Ingredient line in a create or update body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IngredientAmountRequest {
    /// Catalog ingredient id.
    pub id: i64,
    /// Amount in the ingredient's unit; at least 1.
    pub amount: i64,
}

/// Body for recipe create and update.
///
/// On update, absent scalar fields keep their stored value while
/// `ingredients` is always required and replaces the stored set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecipeRequest {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
    /// `data:image/<type>;base64,<payload>` URI.
    pub image: Option<String>,
    pub ingredients: Option<Vec<IngredientAmountRequest>>,
}

impl From<RecipeRequest> for RecipeInput {
    fn from(value: RecipeRequest) -> Self {
        Self {
            name: value.name,
            text: value.text,
            cooking_time: value.cooking_time,
            image: value.image,
            ingredients: value.ingredients.map(|lines| {
                lines
                    .into_iter()
                    .map(|line| IngredientLineInput {
                        id: line.id,
                        amount: line.amount,
                    })
                    .collect()
            }),
        }
    }
}

/// Recipe listing filters.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeListQuery {
    /// Author user id.
    pub author: Option<String>,
    /// `1` for favorites only, `0` to exclude them.
    pub is_favorited: Option<String>,
    /// `1` for cart recipes only, `0` to exclude them.
    pub is_in_shopping_cart: Option<String>,
}

/// Ingredient search query.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IngredientSearchQuery {
    /// Case-insensitive name prefix.
    pub name: Option<String>,
}

/// Response for `GET /api/recipes/{id}/get-link/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    #[schema(example = "https://recipes.example/short/a1B2c3")]
    pub short_link: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_fixtures::{recipe, user};
    use crate::domain::UserProfile;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn recipe_views_render_snake_case_with_absolute_images() {
        let author = user("ada");
        let view = RecipeView {
            recipe: recipe(7, &author.id),
            author: UserProfile {
                user: author,
                is_subscribed: false,
            },
            is_favorited: true,
            is_in_shopping_cart: false,
        };

        let value = serde_json::to_value(RecipeResponse::from_view(
            view,
            &PublicUrls::new("https://recipes.example"),
        ))
        .expect("serialise");

        assert_eq!(value["id"], 7);
        assert_eq!(value["image"], "https://recipes.example/media/recipes/pancakes.png");
        assert_eq!(value["is_favorited"], true);
        assert_eq!(value["cooking_time"], 20);
        assert_eq!(
            value["ingredients"],
            json!([{"id": 1, "name": "Flour", "measurement_unit": "g", "amount": 200}])
        );
        assert_eq!(value["author"]["username"], "ada");
    }

    #[rstest]
    fn absent_ingredients_stay_absent() {
        let input = RecipeInput::from(RecipeRequest {
            name: Some("Tea".to_owned()),
            ..RecipeRequest::default()
        });
        assert!(input.ingredients.is_none());
    }

    #[rstest]
    fn short_links_use_a_hyphenated_key() {
        let value = serde_json::to_value(ShortLinkResponse {
            short_link: "https://recipes.example/short/abc123".to_owned(),
        })
        .expect("serialise");
        assert_eq!(value, json!({"short-link": "https://recipes.example/short/abc123"}));
    }
}
