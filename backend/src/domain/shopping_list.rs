//! Shopping list aggregation over a user's cart.
//!
//! Storage returns per-ingredient totals for the cart; this module merges
//! them by `(name, unit)` and renders the downloadable text document.
//! Lines are ordered by name, then unit, comparing bytes.

use std::collections::BTreeMap;

/// Header written before the first line.
pub const SHOPPING_LIST_HEADER: &str = "Shopping list:\n\n";

/// Suggested attachment name for the rendered document.
pub const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";

/// Amount of one ingredient contributed by the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientTotal {
    /// Ingredient name.
    pub name: String,
    /// Unit of measure.
    pub measurement_unit: String,
    /// Amount in `measurement_unit`.
    pub amount: u64,
}

/// Aggregated shopping list; one entry per `(name, unit)` group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShoppingList {
    lines: Vec<IngredientTotal>,
}

impl ShoppingList {
    /// Group totals by `(name, unit)` and sum each group.
    ///
    /// # Examples
    /// ```
    /// use recipe_backend::domain::{IngredientTotal, ShoppingList};
    ///
    /// let sugar = |amount| IngredientTotal {
    ///     name: "Sugar".to_owned(),
    ///     measurement_unit: "grams".to_owned(),
    ///     amount,
    /// };
    /// let list = ShoppingList::aggregate(vec![sugar(100), sugar(50)]);
    /// assert_eq!(list.render(), "Shopping list:\n\nSugar (grams): 150\n");
    /// ```
    pub fn aggregate(totals: impl IntoIterator<Item = IngredientTotal>) -> Self {
        let mut groups: BTreeMap<(String, String), u64> = BTreeMap::new();
        for total in totals {
            let slot = groups
                .entry((total.name, total.measurement_unit))
                .or_default();
            *slot = slot.saturating_add(total.amount);
        }
        let lines = groups
            .into_iter()
            .map(|((name, measurement_unit), amount)| IngredientTotal {
                name,
                measurement_unit,
                amount,
            })
            .collect();
        Self { lines }
    }

    /// Aggregated lines in output order.
    pub fn lines(&self) -> &[IngredientTotal] {
        self.lines.as_slice()
    }

    /// Render the plain-text document.
    pub fn render(&self) -> String {
        let mut out = String::from(SHOPPING_LIST_HEADER);
        for line in &self.lines {
            out.push_str(&format!(
                "{} ({}): {}\n",
                line.name, line.measurement_unit, line.amount
            ));
        }
        out
    }
}
