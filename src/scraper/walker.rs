//! Structural link discovery on listing and root pages. No I/O.

use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{element_text, selector};
use crate::error::ScrapeResult;
use crate::models::normalize_category;

/// Links found on one category listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingLinks {
    /// Product detail hrefs in document order
    pub products: Vec<String>,
    /// Href of the next page; `None` on the last page
    pub next: Option<String>,
}

/// One entry of the root page's category navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLink {
    /// Normalized category key
    pub name: String,
    pub href: String,
}

/// Product links from `div.image_container > a` and the `li.next > a` control
pub fn links(document: &str) -> ScrapeResult<ListingLinks> {
    let html = Html::parse_document(document);

    let products: Vec<String> = html
        .select(&selector("div.image_container > a")?)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::to_string)
        .collect();

    let next = html
        .select(&selector("li.next > a")?)
        .next()
        .and_then(|anchor| anchor.value().attr("href"))
        .map(str::to_string);

    debug!("Listing has {} product links, next: {:?}", products.len(), next);
    Ok(ListingLinks { products, next })
}

/// Category navigation from `ul.nav > li > ul > li > a`
pub fn categories(document: &str) -> ScrapeResult<Vec<CategoryLink>> {
    let html = Html::parse_document(document);

    let links = html
        .select(&selector("ul.nav > li > ul > li > a")?)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let name = normalize_category(&element_text(anchor));
            if name.is_empty() {
                return None;
            }
            Some(CategoryLink { name, href: href.to_string() })
        })
        .collect();

    Ok(links)
}

/// Directory of a listing URL: the URL with its final path segment removed
pub fn category_base(url: &Url) -> Url {
    let mut base = url.clone();
    if let Ok(mut segments) = base.path_segments_mut() {
        segments.pop().push("");
    }
    base.set_query(None);
    base.set_fragment(None);
    base
}

/// Resolve a next-page href against the current page's directory
pub fn next_page_url(current: &Url, next_href: &str) -> ScrapeResult<Url> {
    super::resolve(&category_base(current), next_href)
}
