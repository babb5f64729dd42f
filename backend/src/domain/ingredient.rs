//! Ingredient catalog entries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum length of an ingredient name.
pub const INGREDIENT_NAME_MAX: usize = 255;
/// Maximum length of a measurement unit.
pub const MEASUREMENT_UNIT_MAX: usize = 50;

/// Primary key of an ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientId(i64);

impl IngredientId {
    /// Wrap a raw key.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw key value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for IngredientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalog ingredient: a name and the unit its amounts are counted in.
///
/// Name and unit together need not be unique; identity is the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    /// Primary key.
    pub id: IngredientId,
    /// Display name, e.g. `Sugar`.
    pub name: String,
    /// Unit of measure, e.g. `grams`.
    pub measurement_unit: String,
}

/// Validation errors for imported ingredients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngredientValidationError {
    /// Name was blank.
    EmptyName,
    /// Name exceeded [`INGREDIENT_NAME_MAX`].
    NameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Unit was blank.
    EmptyUnit,
    /// Unit exceeded [`MEASUREMENT_UNIT_MAX`].
    UnitTooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

impl fmt::Display for IngredientValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "ingredient name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "ingredient name must be at most {max} characters")
            }
            Self::EmptyUnit => write!(f, "measurement unit must not be empty"),
            Self::UnitTooLong { max } => {
                write!(f, "measurement unit must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for IngredientValidationError {}

/// Ingredient awaiting insertion by the bulk import.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NewIngredient {
    name: String,
    measurement_unit: String,
}

impl NewIngredient {
    /// Validate a name/unit pair.
    ///
    /// # Examples
    /// ```
    /// use recipe_backend::domain::NewIngredient;
    ///
    /// let sugar = NewIngredient::new(" Sugar ", "g").expect("valid ingredient");
    /// assert_eq!(sugar.name(), "Sugar");
    /// ```
    pub fn new(
        name: impl Into<String>,
        measurement_unit: impl Into<String>,
    ) -> Result<Self, IngredientValidationError> {
        let name = name.into().trim().to_owned();
        let measurement_unit = measurement_unit.into().trim().to_owned();
        if name.is_empty() {
            return Err(IngredientValidationError::EmptyName);
        }
        if name.chars().count() > INGREDIENT_NAME_MAX {
            return Err(IngredientValidationError::NameTooLong {
                max: INGREDIENT_NAME_MAX,
            });
        }
        if measurement_unit.is_empty() {
            return Err(IngredientValidationError::EmptyUnit);
        }
        if measurement_unit.chars().count() > MEASUREMENT_UNIT_MAX {
            return Err(IngredientValidationError::UnitTooLong {
                max: MEASUREMENT_UNIT_MAX,
            });
        }
        Ok(Self {
            name,
            measurement_unit,
        })
    }

    /// Ingredient name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Unit of measure.
    pub fn measurement_unit(&self) -> &str {
        self.measurement_unit.as_str()
    }
}

/// Counts reported by an ingredient import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngredientImportOutcome {
    /// Pairs written to the catalog.
    pub inserted: usize,
    /// Pairs already present and left untouched.
    pub skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "g", IngredientValidationError::EmptyName)]
    #[case("Salt", "  ", IngredientValidationError::EmptyUnit)]
    fn rejects_blank_fields(
        #[case] name: &str,
        #[case] unit: &str,
        #[case] expected: IngredientValidationError,
    ) {
        assert_eq!(NewIngredient::new(name, unit), Err(expected));
    }

    #[rstest]
    fn rejects_long_units() {
        let unit = "u".repeat(MEASUREMENT_UNIT_MAX + 1);
        assert_eq!(
            NewIngredient::new("Salt", unit),
            Err(IngredientValidationError::UnitTooLong {
                max: MEASUREMENT_UNIT_MAX
            })
        );
    }
}
