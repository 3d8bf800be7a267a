//! Product detail page → [`ProductRecord`].
//!
//! The catalog renders every detail page from one template, so fields are read
//! from fixed structural positions:
//!
//! | field                | position                                   |
//! |----------------------|--------------------------------------------|
//! | UPC                  | `tr > td` cell 0                           |
//! | price excl. tax      | `tr > td` cell 2                           |
//! | price incl. tax      | `tr > td` cell 3                           |
//! | availability         | `tr > td` cell 5, e.g. `In stock (22 available)` |
//! | title                | first `h1`                                 |
//! | description          | fourth `p` (may be absent)                 |
//! | category             | third `li > a` (breadcrumb)                |
//! | rating               | second class token of `.star-rating`       |
//! | cover image          | first `img` `src`                          |
//!
//! Any position that is missing yields `StructuralMismatch`; nothing here
//! indexes unchecked.

use scraper::Html;
use url::Url;

use super::{element_text, selector};
use crate::error::{ScrapeError, ScrapeResult};
use crate::models::{normalize_category, Price, ProductRecord, Rating};

const UPC_CELL: usize = 0;
const PRICE_EXCL_CELL: usize = 2;
const PRICE_INCL_CELL: usize = 3;
const AVAILABILITY_CELL: usize = 5;
const DESCRIPTION_PARAGRAPH: usize = 3;
const CATEGORY_CRUMB: usize = 2;

/// Parses product detail documents
#[derive(Debug, Clone)]
pub struct ProductExtractor {
    site_base: Url,
}

impl ProductExtractor {
    pub fn new(site_base: Url) -> Self {
        Self { site_base }
    }

    /// Extract one record. Deterministic: the same document and URL always
    /// give the same record.
    pub fn extract(&self, document: &str, page_url: &Url) -> ScrapeResult<ProductRecord> {
        let html = Html::parse_document(document);

        let cells: Vec<String> = html.select(&selector("tr > td")?).map(element_text).collect();
        if cells.len() <= AVAILABILITY_CELL {
            return Err(ScrapeError::structural(format!(
                "expected at least {} product table cells, found {}",
                AVAILABILITY_CELL + 1,
                cells.len()
            )));
        }

        let title = html
            .select(&selector("h1")?)
            .next()
            .map(element_text)
            .ok_or_else(|| ScrapeError::structural("missing <h1> title"))?;

        let product_description = html
            .select(&selector("p")?)
            .nth(DESCRIPTION_PARAGRAPH)
            .map(element_text)
            .unwrap_or_default();

        let category = html
            .select(&selector("li > a")?)
            .nth(CATEGORY_CRUMB)
            .map(|crumb| normalize_category(&element_text(crumb)))
            .ok_or_else(|| ScrapeError::structural("breadcrumb has no category link"))?;

        let rating_class = html
            .select(&selector(".star-rating")?)
            .next()
            .and_then(|element| element.value().attr("class"))
            .ok_or_else(|| ScrapeError::structural("missing star-rating marker"))?;
        let review_rating = parse_rating(rating_class)?;

        let image_src = html
            .select(&selector("img")?)
            .next()
            .and_then(|img| img.value().attr("src"))
            .ok_or_else(|| ScrapeError::structural("missing cover <img>"))?;
        let image_url = self.resolve_image(image_src)?;

        Ok(ProductRecord {
            product_page_url: page_url.to_string(),
            universal_product_code: cells[UPC_CELL].clone(),
            title,
            price_including_tax: cells[PRICE_INCL_CELL].parse::<Price>()?,
            price_excluding_tax: cells[PRICE_EXCL_CELL].parse::<Price>()?,
            number_available: parse_availability(&cells[AVAILABILITY_CELL])?,
            product_description,
            category,
            review_rating,
            image_url: image_url.to_string(),
        })
    }

    /// Cover sources are relative (`../../media/...`); strip the climb and
    /// hang the rest off the site root
    fn resolve_image(&self, src: &str) -> ScrapeResult<Url> {
        let mut relative = src;
        while let Some(rest) = relative.strip_prefix("../") {
            relative = rest;
        }
        super::resolve(&self.site_base, relative)
    }
}

/// `In stock (22 available)` → 22
pub fn parse_availability(text: &str) -> ScrapeResult<u32> {
    let malformed = || ScrapeError::MalformedAvailability { raw: text.to_string() };

    let token = text.split_whitespace().nth(2).ok_or_else(malformed)?;
    token.trim_start_matches('(').parse::<u32>().map_err(|_| malformed())
}

/// `star-rating Three` → `Rating::Three`
pub fn parse_rating(class_attr: &str) -> ScrapeResult<Rating> {
    let word = class_attr
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| ScrapeError::structural(format!("rating class '{}' has no rating word", class_attr)))?;
    word.parse()
}
