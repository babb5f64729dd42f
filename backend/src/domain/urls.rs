//! Public URLs derived from the configured site address.

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Length of the random code in a recipe short link.
pub const SHORT_CODE_LEN: usize = 6;

/// Builds absolute URLs for media paths and short links.
///
/// # Examples
/// ```
/// use recipe_backend::domain::PublicUrls;
///
/// let urls = PublicUrls::new("https://recipes.example/");
/// assert_eq!(
///     urls.media("recipes/a.png"),
///     "https://recipes.example/media/recipes/a.png"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUrls {
    base_url: String,
}

impl PublicUrls {
    /// Use `base_url` as the site root; a trailing slash is ignored.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Site root without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Absolute URL of a stored media file.
    pub fn media(&self, path: &str) -> String {
        format!("{}/media/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Fresh short link of the form `<base>/short/<code>`.
    pub fn short_link(&self) -> String {
        let code: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SHORT_CODE_LEN)
            .map(char::from)
            .collect();
        format!("{}/short/{code}", self.base_url)
    }
}
