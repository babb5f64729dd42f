//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// Registered accounts.
    ///
    /// `username` and `email` carry unique constraints; `avatar` is a media
    /// path relative to the media root.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Public handle (max 150 characters).
        username -> Varchar,
        /// Login email (max 254 characters).
        email -> Varchar,
        /// Given name.
        first_name -> Varchar,
        /// Family name.
        last_name -> Varchar,
        /// Encoded password digest.
        password_hash -> Text,
        /// Optional avatar path.
        avatar -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// API tokens; at most one per user.
    auth_tokens (key) {
        /// 40-character hexadecimal token key.
        key -> Bpchar,
        /// Owning user (unique).
        user_id -> Uuid,
        /// Issue timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ingredient catalog.
    ingredients (id) {
        id -> Int8,
        name -> Varchar,
        measurement_unit -> Varchar,
    }
}

diesel::table! {
    /// Recipe headers. Ingredient rows live in `recipe_ingredients`.
    recipes (id) {
        id -> Int8,
        /// Authoring user.
        author_id -> Uuid,
        name -> Varchar,
        text -> Text,
        /// Image path relative to the media root.
        image -> Text,
        /// Minutes, at least 1.
        cooking_time -> Int4,
        /// Creation timestamp driving newest-first ordering.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ingredient lines; `(recipe_id, ingredient_id)` is unique.
    recipe_ingredients (id) {
        id -> Int8,
        recipe_id -> Int8,
        ingredient_id -> Int8,
        /// Amount in the ingredient's unit, at least 1.
        amount -> Int4,
    }
}

diesel::table! {
    /// Favorite relation; `(user_id, recipe_id)` is unique.
    favorites (id) {
        id -> Int8,
        user_id -> Uuid,
        recipe_id -> Int8,
    }
}

diesel::table! {
    /// Shopping-cart relation; `(user_id, recipe_id)` is unique.
    shopping_cart (id) {
        id -> Int8,
        user_id -> Uuid,
        recipe_id -> Int8,
    }
}

diesel::table! {
    /// Follower relation: `user_id` follows `author_id`.
    subscriptions (id) {
        id -> Int8,
        user_id -> Uuid,
        author_id -> Uuid,
    }
}

diesel::joinable!(auth_tokens -> users (user_id));
diesel::joinable!(recipes -> users (author_id));
diesel::joinable!(recipe_ingredients -> recipes (recipe_id));
diesel::joinable!(recipe_ingredients -> ingredients (ingredient_id));
diesel::joinable!(favorites -> recipes (recipe_id));
diesel::joinable!(shopping_cart -> recipes (recipe_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    auth_tokens,
    ingredients,
    recipes,
    recipe_ingredients,
    favorites,
    shopping_cart,
    subscriptions,
);
