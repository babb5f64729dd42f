//! Follower relation between users.

use super::{RecipeSummary, UserProfile};

/// Optional cap on how many recipes accompany an author in subscription
/// responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecipesLimit(Option<usize>);

impl RecipesLimit {
    /// No cap.
    pub const UNCAPPED: Self = Self(None);

    /// Cap at `limit` recipes.
    pub const fn at_most(limit: usize) -> Self {
        Self(Some(limit))
    }

    /// Parse the `recipes_limit` query value.
    ///
    /// Absent, non-numeric or negative values leave the list uncapped.
    ///
    /// # Examples
    /// ```
    /// use recipe_backend::domain::RecipesLimit;
    ///
    /// assert_eq!(RecipesLimit::parse(Some("3")), RecipesLimit::at_most(3));
    /// assert_eq!(RecipesLimit::parse(Some("many")), RecipesLimit::UNCAPPED);
    /// ```
    pub fn parse(raw: Option<&str>) -> Self {
        Self(raw.and_then(|value| value.trim().parse::<usize>().ok()))
    }

    /// Cap value, when one applies.
    pub const fn get(self) -> Option<usize> {
        self.0
    }
}

/// A followed author with their recipe count and a capped recipe sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorProfile {
    /// The author relative to the viewer.
    pub profile: UserProfile,
    /// Total number of recipes the author has published.
    pub recipes_count: u64,
    /// Newest recipes first, capped by [`RecipesLimit`].
    pub recipes: Vec<RecipeSummary>,
}
