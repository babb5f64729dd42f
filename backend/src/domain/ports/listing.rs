//! One page of results plus the total they were drawn from.

/// Items for the requested page and the unpaged total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total number of matching items across all pages.
    pub total: u64,
}

impl<T> Listing<T> {
    /// Bundle a page of items with its total.
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    /// Transform each item, keeping the total.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
        Listing {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}
