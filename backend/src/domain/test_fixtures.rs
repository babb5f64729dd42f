//! Shared builders for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use mockable::{Clock, MockClock};

use super::{
    EmailAddress, Ingredient, IngredientId, PersonName, Recipe, RecipeId, RecipeIngredient, User,
    UserId, Username,
};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    let mut clock = MockClock::new();
    clock.expect_utc().return_const(fixture_timestamp());
    Arc::new(clock)
}

pub(crate) fn user(username: &str) -> User {
    User {
        id: UserId::random(),
        username: Username::new(username).expect("valid username"),
        email: EmailAddress::new(format!("{username}@example.com")).expect("valid email"),
        first_name: PersonName::from_stored("Ada"),
        last_name: PersonName::from_stored("Lovelace"),
        avatar: None,
    }
}

pub(crate) fn ingredient(id: i64, name: &str, unit: &str) -> Ingredient {
    Ingredient {
        id: IngredientId::new(id),
        name: name.to_owned(),
        measurement_unit: unit.to_owned(),
    }
}

pub(crate) fn recipe(id: i64, author: &UserId) -> Recipe {
    Recipe {
        id: RecipeId::new(id),
        author: author.clone(),
        name: "Pancakes".to_owned(),
        text: "Mix and fry.".to_owned(),
        image: "recipes/pancakes.png".to_owned(),
        cooking_time: 20,
        ingredients: vec![RecipeIngredient {
            ingredient: ingredient(1, "Flour", "g"),
            amount: 200,
        }],
        created_at: fixture_timestamp(),
    }
}
