//! Recipe aggregate: a recipe and the ingredient set it owns.
//!
//! Requests arrive as a loosely typed [`RecipeInput`]. [`RecipeDraft`] (create)
//! and [`RecipeChanges`] (update) validate it into value objects before any
//! storage is touched. The ingredient set rules live in [`IngredientSet`]:
//!
//! - the set must be present and non-empty;
//! - every amount is at least 1;
//! - no ingredient appears twice.
//!
//! Whether each ingredient exists is checked by the recipe service against
//! the catalog, because it needs a repository.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ImageUpload, ImageValidationError, Ingredient, IngredientId, UserId, UserProfile};

/// Maximum length of a recipe name.
pub const RECIPE_NAME_MAX: usize = 255;
/// Largest amount or cooking time storage accepts.
pub const POSITIVE_INT_MAX: u32 = 2_147_483_647;

/// Primary key of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(i64);

impl RecipeId {
    /// Wrap a raw key.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw key value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation failures for recipe payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeValidationError {
    /// The ingredient set was absent or empty.
    NoIngredients,
    /// An amount was below 1.
    AmountTooSmall {
        /// Ingredient carrying the bad amount.
        ingredient_id: IngredientId,
    },
    /// An amount exceeded [`POSITIVE_INT_MAX`].
    AmountTooLarge {
        /// Ingredient carrying the bad amount.
        ingredient_id: IngredientId,
    },
    /// An ingredient appeared more than once.
    DuplicateIngredient {
        /// Repeated ingredient.
        ingredient_id: IngredientId,
    },
    /// Ingredients that do not exist in the catalog.
    UnknownIngredients {
        /// Missing ingredient keys, ascending.
        ingredient_ids: Vec<IngredientId>,
    },
    /// Cooking time was absent or below 1.
    CookingTimeTooSmall,
    /// Cooking time exceeded [`POSITIVE_INT_MAX`].
    CookingTimeTooLarge,
    /// Name was absent or blank.
    EmptyName,
    /// Name exceeded [`RECIPE_NAME_MAX`].
    NameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Description was absent or blank.
    EmptyText,
    /// Image was absent on create.
    MissingImage,
    /// Image payload could not be decoded.
    Image(ImageValidationError),
}

impl RecipeValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::NoIngredients
            | Self::AmountTooSmall { .. }
            | Self::AmountTooLarge { .. }
            | Self::DuplicateIngredient { .. }
            | Self::UnknownIngredients { .. } => "ingredients",
            Self::CookingTimeTooSmall | Self::CookingTimeTooLarge => "cooking_time",
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::EmptyText => "text",
            Self::MissingImage | Self::Image(_) => "image",
        }
    }

    /// Machine-readable validation code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoIngredients => "empty_ingredients",
            Self::AmountTooSmall { .. } => "amount_too_small",
            Self::AmountTooLarge { .. } => "amount_too_large",
            Self::DuplicateIngredient { .. } => "duplicate_ingredient",
            Self::UnknownIngredients { .. } => "unknown_ingredient",
            Self::CookingTimeTooSmall => "cooking_time_too_small",
            Self::CookingTimeTooLarge => "cooking_time_too_large",
            Self::EmptyName => "empty_name",
            Self::NameTooLong { .. } => "name_too_long",
            Self::EmptyText => "empty_text",
            Self::MissingImage => "missing_image",
            Self::Image(inner) => inner.code(),
        }
    }
}

impl fmt::Display for RecipeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoIngredients => write!(f, "ingredients must not be empty"),
            Self::AmountTooSmall { ingredient_id } => {
                write!(f, "amount for ingredient {ingredient_id} must be at least 1")
            }
            Self::AmountTooLarge { ingredient_id } => {
                write!(
                    f,
                    "amount for ingredient {ingredient_id} must be at most {POSITIVE_INT_MAX}"
                )
            }
            Self::DuplicateIngredient { ingredient_id } => {
                write!(f, "ingredient {ingredient_id} is listed more than once")
            }
            Self::UnknownIngredients { ingredient_ids } => {
                let ids: Vec<String> = ingredient_ids.iter().map(ToString::to_string).collect();
                write!(f, "unknown ingredients: {}", ids.join(", "))
            }
            Self::CookingTimeTooSmall => write!(f, "cooking_time must be at least 1 minute"),
            Self::CookingTimeTooLarge => {
                write!(f, "cooking_time must be at most {POSITIVE_INT_MAX} minutes")
            }
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::EmptyText => write!(f, "text must not be empty"),
            Self::MissingImage => write!(f, "image is required"),
            Self::Image(inner) => write!(f, "{inner}"),
        }
    }
}

impl std::error::Error for RecipeValidationError {}

impl From<ImageValidationError> for RecipeValidationError {
    fn from(value: ImageValidationError) -> Self {
        Self::Image(value)
    }
}

/// Cooking time in minutes, at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CookingTime(u32);

impl CookingTime {
    /// Validate a raw minute count.
    pub fn new(minutes: i64) -> Result<Self, RecipeValidationError> {
        if minutes < 1 {
            return Err(RecipeValidationError::CookingTimeTooSmall);
        }
        u32::try_from(minutes)
            .ok()
            .filter(|value| *value <= POSITIVE_INT_MAX)
            .map(Self)
            .ok_or(RecipeValidationError::CookingTimeTooLarge)
    }

    /// Minutes.
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Recipe title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeName(String);

impl RecipeName {
    /// Validate a title.
    pub fn new(name: impl Into<String>) -> Result<Self, RecipeValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RecipeValidationError::EmptyName);
        }
        if trimmed.chars().count() > RECIPE_NAME_MAX {
            return Err(RecipeValidationError::NameTooLong {
                max: RECIPE_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for RecipeName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Recipe description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeText(String);

impl RecipeText {
    /// Validate a description.
    pub fn new(text: impl Into<String>) -> Result<Self, RecipeValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(RecipeValidationError::EmptyText);
        }
        Ok(Self(text))
    }
}

impl AsRef<str> for RecipeText {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Raw ingredient line as supplied by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientLineInput {
    /// Catalog key.
    pub id: i64,
    /// Requested amount.
    pub amount: i64,
}

/// One validated (ingredient, amount) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IngredientLine {
    /// Catalog key.
    pub ingredient_id: IngredientId,
    /// Amount in the ingredient's unit, at least 1.
    pub amount: u32,
}

/// Validated ingredient set of a recipe.
///
/// # Examples
/// ```
/// use recipe_backend::domain::{IngredientLineInput, IngredientSet, RecipeValidationError};
///
/// let lines = vec![
///     IngredientLineInput { id: 1, amount: 100 },
///     IngredientLineInput { id: 1, amount: 50 },
/// ];
/// let err = IngredientSet::from_input(Some(lines)).expect_err("duplicates are rejected");
/// assert_eq!(err.field(), "ingredients");
/// assert!(matches!(err, RecipeValidationError::DuplicateIngredient { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientSet(Vec<IngredientLine>);

impl IngredientSet {
    /// Validate client lines. `None` means the field was absent.
    pub fn from_input(lines: Option<Vec<IngredientLineInput>>) -> Result<Self, RecipeValidationError> {
        let lines = lines.unwrap_or_default();
        if lines.is_empty() {
            return Err(RecipeValidationError::NoIngredients);
        }
        let mut seen = HashSet::with_capacity(lines.len());
        let mut validated = Vec::with_capacity(lines.len());
        for line in lines {
            let ingredient_id = IngredientId::new(line.id);
            if line.amount < 1 {
                return Err(RecipeValidationError::AmountTooSmall { ingredient_id });
            }
            let amount = u32::try_from(line.amount)
                .ok()
                .filter(|value| *value <= POSITIVE_INT_MAX)
                .ok_or(RecipeValidationError::AmountTooLarge { ingredient_id })?;
            if !seen.insert(ingredient_id) {
                return Err(RecipeValidationError::DuplicateIngredient { ingredient_id });
            }
            validated.push(IngredientLine {
                ingredient_id,
                amount,
            });
        }
        Ok(Self(validated))
    }

    /// Lines in request order.
    pub fn lines(&self) -> &[IngredientLine] {
        self.0.as_slice()
    }

    /// Distinct ingredient keys, ascending.
    pub fn ingredient_ids(&self) -> Vec<IngredientId> {
        let mut ids: Vec<IngredientId> = self.0.iter().map(|line| line.ingredient_id).collect();
        ids.sort_unstable();
        ids
    }

    /// Consume the set.
    pub fn into_lines(self) -> Vec<IngredientLine> {
        self.0
    }
}

/// Loosely typed recipe payload shared by create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeInput {
    /// Title.
    pub name: Option<String>,
    /// Description.
    pub text: Option<String>,
    /// Cooking time in minutes.
    pub cooking_time: Option<i64>,
    /// Base64 data URI.
    pub image: Option<String>,
    /// Ingredient lines; `None` when the field was absent.
    pub ingredients: Option<Vec<IngredientLineInput>>,
}

/// Validated payload for creating a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    /// Title.
    pub name: RecipeName,
    /// Description.
    pub text: RecipeText,
    /// Cooking time.
    pub cooking_time: CookingTime,
    /// Decoded image.
    pub image: ImageUpload,
    /// Ingredient set.
    pub ingredients: IngredientSet,
}

impl RecipeDraft {
    /// Validate a create payload; every field is required.
    pub fn try_from_input(input: RecipeInput) -> Result<Self, RecipeValidationError> {
        let ingredients = IngredientSet::from_input(input.ingredients)?;
        let name = RecipeName::new(input.name.unwrap_or_default())?;
        let text = RecipeText::new(input.text.unwrap_or_default())?;
        let cooking_time = CookingTime::new(input.cooking_time.unwrap_or(0))?;
        let image = input
            .image
            .ok_or(RecipeValidationError::MissingImage)
            .and_then(|raw| ImageUpload::from_data_uri(&raw).map_err(Into::into))?;
        Ok(Self {
            name,
            text,
            cooking_time,
            image,
            ingredients,
        })
    }
}

/// Validated payload for updating a recipe.
///
/// Scalar fields are optional and keep their stored value when absent; the
/// ingredient set is mandatory and replaces the stored set wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeChanges {
    /// New title.
    pub name: Option<RecipeName>,
    /// New description.
    pub text: Option<RecipeText>,
    /// New cooking time.
    pub cooking_time: Option<CookingTime>,
    /// New image.
    pub image: Option<ImageUpload>,
    /// Replacement ingredient set.
    pub ingredients: IngredientSet,
}

impl RecipeChanges {
    /// Validate an update payload.
    pub fn try_from_input(input: RecipeInput) -> Result<Self, RecipeValidationError> {
        let ingredients = IngredientSet::from_input(input.ingredients)?;
        let name = input.name.map(RecipeName::new).transpose()?;
        let text = input.text.map(RecipeText::new).transpose()?;
        let cooking_time = input.cooking_time.map(CookingTime::new).transpose()?;
        let image = input
            .image
            .map(|raw| ImageUpload::from_data_uri(&raw))
            .transpose()?;
        Ok(Self {
            name,
            text,
            cooking_time,
            image,
            ingredients,
        })
    }
}

/// Ingredient as it appears inside a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeIngredient {
    /// Catalog entry.
    pub ingredient: Ingredient,
    /// Amount in the ingredient's unit.
    pub amount: u32,
}

/// Stored recipe with its ingredient set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    /// Primary key.
    pub id: RecipeId,
    /// Author's identifier.
    pub author: UserId,
    /// Title.
    pub name: String,
    /// Description.
    pub text: String,
    /// Image path relative to the media root.
    pub image: String,
    /// Cooking time in minutes.
    pub cooking_time: u32,
    /// Ingredient set ordered by ingredient name.
    pub ingredients: Vec<RecipeIngredient>,
    /// Creation timestamp used for newest-first listings.
    pub created_at: DateTime<Utc>,
}

impl Recipe {
    /// Short representation used by relation endpoints.
    pub fn summary(&self) -> RecipeSummary {
        RecipeSummary {
            id: self.id,
            name: self.name.clone(),
            image: self.image.clone(),
            cooking_time: self.cooking_time,
        }
    }
}

/// Recipe as presented to a particular viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeView {
    /// The recipe.
    pub recipe: Recipe,
    /// The author's profile relative to the viewer.
    pub author: UserProfile,
    /// Whether the viewer has favorited the recipe.
    pub is_favorited: bool,
    /// Whether the recipe is in the viewer's shopping cart.
    pub is_in_shopping_cart: bool,
}

/// Short recipe representation: id, name, image and cooking time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeSummary {
    /// Primary key.
    pub id: RecipeId,
    /// Title.
    pub name: String,
    /// Image path relative to the media root.
    pub image: String,
    /// Cooking time in minutes.
    pub cooking_time: u32,
}

/// Listing filter for recipes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Restrict to recipes by this author.
    pub author: Option<UserId>,
    /// Restrict to recipes the viewer has (`true`) or has not (`false`) favorited.
    pub is_favorited: Option<bool>,
    /// Restrict to recipes in (`true`) or not in (`false`) the viewer's cart.
    pub is_in_shopping_cart: Option<bool>,
    /// Viewer the relation filters apply to.
    pub viewer: Option<UserId>,
}

impl RecipeFilter {
    /// Drop the relation filters when there is no viewer to scope them to.
    ///
    /// # Examples
    /// ```
    /// use recipe_backend::domain::RecipeFilter;
    ///
    /// let filter = RecipeFilter {
    ///     is_favorited: Some(true),
    ///     ..RecipeFilter::default()
    /// }
    /// .scoped_to(None);
    /// assert_eq!(filter.is_favorited, None);
    /// ```
    pub fn scoped_to(mut self, viewer: Option<UserId>) -> Self {
        if viewer.is_none() {
            self.is_favorited = None;
            self.is_in_shopping_cart = None;
        }
        self.viewer = viewer;
        self
    }

    /// Parse a `1`/`0` flag; any other value means "no filter".
    pub fn parse_flag(raw: Option<&str>) -> Option<bool> {
        match raw.map(str::trim) {
            Some("1") => Some(true),
            Some("0") => Some(false),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests;
