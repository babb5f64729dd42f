//! Limit/offset pagination primitives shared by list endpoints.
//!
//! Handlers parse the raw `limit` and `offset` query parameters into a
//! [`PageRequest`] using a [`PageLimits`] policy, fetch one window of rows,
//! and wrap them in a [`Page`] envelope that carries the total count and
//! absolute links to the neighbouring windows.
//!
//! Parsing is lenient: malformed or non-positive `limit` values fall back to
//! the policy default and malformed `offset` values fall back to zero, so a
//! bad query string never turns a listing into an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Default number of items returned when the client does not ask for a size.
pub const DEFAULT_LIMIT: u32 = 6;

/// Upper bound applied by [`PageLimits::capped`].
pub const MAX_LIMIT: u32 = 100;

const LIMIT_PARAM: &str = "limit";
const OFFSET_PARAM: &str = "offset";

/// Raw pagination query parameters as received from the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageQuery {
    /// Requested page size.
    pub limit: Option<String>,
    /// Number of items to skip.
    pub offset: Option<String>,
}

/// Page size policy for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    default_limit: u32,
    max_limit: Option<u32>,
}

impl PageLimits {
    /// Default page size with no upper bound on client overrides.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: None,
        }
    }

    /// Default page size with client overrides capped at [`MAX_LIMIT`].
    #[must_use]
    pub const fn capped() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: Some(MAX_LIMIT),
        }
    }

    fn clamp(self, requested: u32) -> u32 {
        match self.max_limit {
            Some(max) => requested.min(max),
            None => requested,
        }
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self::standard()
    }
}

/// Validated window into a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: u32,
    offset: u64,
}

impl PageRequest {
    /// Build a request from explicit values.
    ///
    /// A zero `limit` is replaced with [`DEFAULT_LIMIT`].
    ///
    /// # Examples
    /// ```
    /// use pagination::PageRequest;
    ///
    /// let request = PageRequest::new(0, 12);
    /// assert_eq!(request.limit(), 6);
    /// assert_eq!(request.offset(), 12);
    /// ```
    #[must_use]
    pub const fn new(limit: u32, offset: u64) -> Self {
        let limit = if limit == 0 { DEFAULT_LIMIT } else { limit };
        Self { limit, offset }
    }

    /// Parse raw query parameters under the supplied policy.
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageLimits, PageQuery, PageRequest};
    ///
    /// let query = PageQuery {
    ///     limit: Some("500".to_owned()),
    ///     offset: Some("nope".to_owned()),
    /// };
    /// let request = PageRequest::from_query(&query, PageLimits::capped());
    /// assert_eq!(request.limit(), 100);
    /// assert_eq!(request.offset(), 0);
    /// ```
    #[must_use]
    pub fn from_query(query: &PageQuery, limits: PageLimits) -> Self {
        let limit = query
            .limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|value| *value > 0)
            .map_or(limits.default_limit, |value| limits.clamp(value));
        let offset = query
            .offset
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(0);
        Self { limit, offset }
    }

    /// Maximum number of items in the window.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items skipped before the window.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    fn next_offset(self, count: u64) -> Option<u64> {
        let next = self.offset.saturating_add(u64::from(self.limit));
        (next < count).then_some(next)
    }

    fn previous_offset(self) -> Option<Option<u64>> {
        if self.offset == 0 {
            return None;
        }
        let previous = self.offset.saturating_sub(u64::from(self.limit));
        Some((previous > 0).then_some(previous))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, 0)
    }
}

/// Errors raised while building page links.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// The request URL used as the link base could not be parsed.
    #[error("invalid page base url `{url}`: {message}")]
    InvalidBaseUrl {
        /// Offending URL text.
        url: String,
        /// Parser error description.
        message: String,
    },
}

/// Response envelope for a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Total number of items across all pages.
    pub count: u64,
    /// Absolute link to the following window, if any.
    pub next: Option<String>,
    /// Absolute link to the preceding window, if any.
    pub previous: Option<String>,
    /// Items in this window.
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Wrap a window of results, deriving neighbour links from `request_url`.
    ///
    /// Existing query parameters other than `limit` and `offset` are kept so
    /// filters survive navigation. The first page link omits `offset`.
    ///
    /// # Errors
    /// Returns [`PaginationError::InvalidBaseUrl`] when `request_url` is not an
    /// absolute URL.
    ///
    /// # Examples
    /// ```
    /// use pagination::{Page, PageRequest};
    ///
    /// let page = Page::new(
    ///     vec![1, 2],
    ///     5,
    ///     PageRequest::new(2, 2),
    ///     "http://localhost/api/recipes/?author=7&limit=2&offset=2",
    /// )?;
    /// assert_eq!(
    ///     page.next.as_deref(),
    ///     Some("http://localhost/api/recipes/?author=7&limit=2&offset=4"),
    /// );
    /// assert_eq!(
    ///     page.previous.as_deref(),
    ///     Some("http://localhost/api/recipes/?author=7&limit=2"),
    /// );
    /// # Ok::<(), pagination::PaginationError>(())
    /// ```
    pub fn new(
        results: Vec<T>,
        count: u64,
        request: PageRequest,
        request_url: &str,
    ) -> Result<Self, PaginationError> {
        let base = Url::parse(request_url).map_err(|err| PaginationError::InvalidBaseUrl {
            url: request_url.to_owned(),
            message: err.to_string(),
        })?;
        let next = request
            .next_offset(count)
            .map(|offset| window_link(&base, request.limit, Some(offset)));
        let previous = request
            .previous_offset()
            .map(|offset| window_link(&base, request.limit, offset));
        Ok(Self {
            count,
            next,
            previous,
            results,
        })
    }

    /// Transform every result while keeping the envelope.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

fn window_link(base: &Url, limit: u32, offset: Option<u64>) -> String {
    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != LIMIT_PARAM && key != OFFSET_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    let mut link = base.clone();
    {
        let mut pairs = link.query_pairs_mut();
        pairs.clear();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(LIMIT_PARAM, &limit.to_string());
        if let Some(offset) = offset {
            pairs.append_pair(OFFSET_PARAM, &offset.to_string());
        }
    }
    link.into()
}

#[cfg(test)]
mod tests {
    //! Unit coverage for query parsing and link construction.

    use super::*;
    use rstest::rstest;

    fn query(limit: Option<&str>, offset: Option<&str>) -> PageQuery {
        PageQuery {
            limit: limit.map(str::to_owned),
            offset: offset.map(str::to_owned),
        }
    }

    #[rstest]
    #[case(None, DEFAULT_LIMIT)]
    #[case(Some("10"), 10)]
    #[case(Some("0"), DEFAULT_LIMIT)]
    #[case(Some("-3"), DEFAULT_LIMIT)]
    #[case(Some("ten"), DEFAULT_LIMIT)]
    #[case(Some("250"), 250)]
    fn standard_limits_are_lenient(#[case] raw: Option<&str>, #[case] expected: u32) {
        let request = PageRequest::from_query(&query(raw, None), PageLimits::standard());
        assert_eq!(request.limit(), expected);
    }

    #[rstest]
    #[case(Some("250"), MAX_LIMIT)]
    #[case(Some("100"), 100)]
    #[case(Some("7"), 7)]
    fn capped_limits_never_exceed_the_maximum(#[case] raw: Option<&str>, #[case] expected: u32) {
        let request = PageRequest::from_query(&query(raw, None), PageLimits::capped());
        assert_eq!(request.limit(), expected);
    }

    #[rstest]
    #[case(None, 0)]
    #[case(Some("12"), 12)]
    #[case(Some("-1"), 0)]
    fn offsets_default_to_zero(#[case] raw: Option<&str>, #[case] expected: u64) {
        let request = PageRequest::from_query(&query(None, raw), PageLimits::standard());
        assert_eq!(request.offset(), expected);
    }

    #[rstest]
    fn first_page_has_no_previous_link() {
        let page = Page::new(
            vec!["a"; 6],
            8,
            PageRequest::default(),
            "http://localhost/api/users/",
        )
        .expect("valid base url");
        assert!(page.previous.is_none());
        assert_eq!(
            page.next.as_deref(),
            Some("http://localhost/api/users/?limit=6&offset=6")
        );
    }

    #[rstest]
    fn last_page_has_no_next_link() {
        let page = Page::new(
            vec!["a"; 2],
            8,
            PageRequest::new(6, 6),
            "http://localhost/api/users/?limit=6&offset=6",
        )
        .expect("valid base url");
        assert!(page.next.is_none());
        assert_eq!(
            page.previous.as_deref(),
            Some("http://localhost/api/users/?limit=6")
        );
    }

    #[rstest]
    fn relative_base_urls_are_rejected() {
        let result = Page::<u8>::new(Vec::new(), 0, PageRequest::default(), "/api/users/");
        assert!(matches!(
            result,
            Err(PaginationError::InvalidBaseUrl { .. })
        ));
    }

    #[rstest]
    fn envelope_serialises_all_fields() {
        let page = Page::new(vec![1_u8], 1, PageRequest::default(), "http://localhost/")
            .expect("valid base url")
            .map(u32::from);
        let value = serde_json::to_value(&page).expect("serialise page");
        assert_eq!(
            value,
            serde_json::json!({
                "count": 1,
                "next": null,
                "previous": null,
                "results": [1],
            })
        );
    }
}
