use async_trait::async_trait;
use scraper::{ElementRef, Selector};
use url::Url;

pub mod extractor;
pub mod http_client;
pub mod images;
pub mod limiter;
pub mod walker;

pub use extractor::ProductExtractor;
pub use http_client::HttpClient;
pub use images::ImageFetcher;
pub use walker::{CategoryLink, ListingLinks};

use crate::error::{ScrapeError, ScrapeResult};

/// Source of documents and binary resources.
///
/// Everything that performs I/O against the catalog goes through this trait,
/// so the crawl can be driven by the real [`HttpClient`] or an in-memory site.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// GET a document body; non-success statuses are errors
    async fn fetch_text(&self, url: &Url) -> ScrapeResult<String>;

    /// GET raw bytes; non-success statuses are errors
    async fn fetch_bytes(&self, url: &Url) -> ScrapeResult<Vec<u8>>;
}

/// Parse a CSS selector
pub(crate) fn selector(css: &str) -> ScrapeResult<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::config(format!("invalid selector '{}': {:?}", css, e)))
}

/// Concatenated text content of an element, trimmed
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Resolve an href relative to the document it was found in
pub fn resolve(base: &Url, href: &str) -> ScrapeResult<Url> {
    base.join(href).map_err(|e| ScrapeError::InvalidUrl {
        url: href.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_product_link_from_listing() {
        let listing = Url::parse("https://books.toscrape.com/catalogue/category/books/travel_2/index.html").unwrap();
        let url = resolve(&listing, "../../../its-only-the-himalayas_981/index.html").unwrap();
        assert_eq!(url.as_str(), "https://books.toscrape.com/catalogue/its-only-the-himalayas_981/index.html");
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        assert!(matches!(selector("div[["), Err(ScrapeError::Configuration { .. })));
    }
}
