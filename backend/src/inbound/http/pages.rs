//! Wrap domain listings in the paginated response envelope.

use actix_web::HttpRequest;
use pagination::{Page, PageRequest};
use tracing::error;

use crate::domain::Error;
use crate::domain::ports::Listing;

/// Build a page whose `next`/`previous` links are derived from the request
/// URL, rendering each item with `render`.
pub(crate) fn page_response<T, U>(
    req: &HttpRequest,
    listing: Listing<T>,
    request: PageRequest,
    render: impl FnMut(T) -> U,
) -> Result<Page<U>, Error> {
    let Listing { items, total } = listing;
    let url = req.full_url();
    Page::new(items, total, request, url.as_str())
        .map(|page| page.map(render))
        .map_err(|err| {
            error!(error = %err, "failed to build page links");
            Error::internal(err.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    #[rstest]
    fn links_keep_filters_and_advance_the_offset() {
        let req = TestRequest::get()
            .uri("/api/recipes/?author=abc&limit=2")
            .to_http_request();

        let page = page_response(
            &req,
            Listing::new(vec![1_u8, 2], 5),
            PageRequest::new(2, 0),
            u32::from,
        )
        .expect("page");

        assert_eq!(page.count, 5);
        assert_eq!(page.results, vec![1_u32, 2]);
        let next = page.next.expect("next link");
        assert!(next.ends_with("/api/recipes/?author=abc&limit=2&offset=2"), "{next}");
        assert!(page.previous.is_none());
    }
}
