//! Favorite and shopping-cart relations between a user and a recipe.
//!
//! Both relations share one two-state machine per `(user, recipe)` pair:
//! adding a present pair is a conflict, removing an absent pair is not found.

use std::fmt;

/// Which user/recipe relation an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// The user marked the recipe as a favorite.
    Favorite,
    /// The recipe sits in the user's shopping cart.
    ShoppingCart,
}

impl RelationKind {
    /// Message used when adding a pair that already exists.
    pub fn duplicate_message(self) -> &'static str {
        match self {
            Self::Favorite => "recipe is already in favorites",
            Self::ShoppingCart => "recipe is already in the shopping cart",
        }
    }

    /// Message used when removing a pair that does not exist.
    pub fn missing_message(self) -> &'static str {
        match self {
            Self::Favorite => "recipe is not in favorites",
            Self::ShoppingCart => "recipe is not in the shopping cart",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Favorite => "favorite",
            Self::ShoppingCart => "shopping_cart",
        })
    }
}
