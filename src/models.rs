//! Records produced by the crawl and the statistics computed over them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ScrapeError, ScrapeResult};

/// Mis-decoded UTF-8 lead byte of `£` that the catalog leaves in price cells
pub const ENCODING_ARTIFACT: char = 'Â';

pub const CURRENCY_SYMBOL: char = '£';

/// Column order of every category dataset
pub const DATASET_HEADER: [&str; 10] = [
    "product_page_url",
    "universal_product_code",
    "title",
    "price_including_tax",
    "price_excluding_tax",
    "number_available",
    "product_description",
    "category",
    "review_rating",
    "image_url",
];

/// Index of `price_including_tax` in [`DATASET_HEADER`]
pub const PRICE_INCLUDING_TAX_COLUMN: usize = 3;

/// Category → stats, kept in category discovery order
pub type CategoryStatsMap = IndexMap<String, CategoryStats>;

/// Canonical category key: lowercase with all whitespace removed.
///
/// Every place that turns a category label into a key goes through here, so
/// the breadcrumb on a detail page and the navigation entry on the root page
/// land on the same dataset.
pub fn normalize_category(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// A non-negative GBP amount held in pence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price {
    pence: u64,
}

impl Price {
    pub fn from_pence(pence: u64) -> Self {
        Self { pence }
    }

    pub fn pence(&self) -> u64 {
        self.pence
    }

    pub fn as_f64(&self) -> f64 {
        self.pence as f64 / 100.0
    }
}

impl FromStr for Price {
    type Err = ScrapeError;

    /// Accepts `£51.77`, `Â£51.77`, ` 51.77 `, `51.5` and bare `51`;
    /// nothing but digits with at most two fraction digits
    fn from_str(raw: &str) -> ScrapeResult<Self> {
        let malformed = || ScrapeError::MalformedPrice { raw: raw.to_string() };

        let cleaned = raw.replace(ENCODING_ARTIFACT, "");
        let amount = cleaned.trim().trim_start_matches(CURRENCY_SYMBOL).trim();

        let (whole, fraction) = match amount.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (amount, None),
        };
        let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !is_digits(whole) {
            return Err(malformed());
        }

        let fraction_pence = match fraction {
            None => 0,
            Some(f) if is_digits(f) && f.len() <= 2 => {
                let value: u64 = f.parse().map_err(|_| malformed())?;
                if f.len() == 1 { value * 10 } else { value }
            }
            Some(_) => return Err(malformed()),
        };

        let pence = whole
            .parse::<u64>()
            .ok()
            .and_then(|units| units.checked_mul(100))
            .and_then(|pence| pence.checked_add(fraction_pence))
            .ok_or_else(malformed)?;

        Ok(Self { pence })
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}.{:02}", CURRENCY_SYMBOL, self.pence / 100, self.pence % 100)
    }
}

/// Star rating shown on a product page
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rating {
    One,
    Two,
    Three,
    Four,
    Five,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::One => "One",
            Rating::Two => "Two",
            Rating::Three => "Three",
            Rating::Four => "Four",
            Rating::Five => "Five",
        }
    }
}

impl FromStr for Rating {
    type Err = ScrapeError;

    fn from_str(s: &str) -> ScrapeResult<Self> {
        match s {
            "One" => Ok(Rating::One),
            "Two" => Ok(Rating::Two),
            "Three" => Ok(Rating::Three),
            "Four" => Ok(Rating::Four),
            "Five" => Ok(Rating::Five),
            other => Err(ScrapeError::structural(format!("unknown rating word '{}'", other))),
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scraped product. Built once per detail page and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_page_url: String,
    pub universal_product_code: String,
    pub title: String,
    pub price_including_tax: Price,
    pub price_excluding_tax: Price,
    pub number_available: u32,
    pub product_description: String,
    pub category: String,
    pub review_rating: Rating,
    pub image_url: String,
}

impl ProductRecord {
    /// Row in [`DATASET_HEADER`] order
    pub fn to_row(&self) -> [String; 10] {
        [
            self.product_page_url.clone(),
            self.universal_product_code.clone(),
            self.title.clone(),
            self.price_including_tax.to_string(),
            self.price_excluding_tax.to_string(),
            self.number_available.to_string(),
            self.product_description.clone(),
            self.category.clone(),
            self.review_rating.to_string(),
            self.image_url.clone(),
        ]
    }
}

/// Aggregate over one category dataset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub count: usize,
    /// Mean price including tax, rounded to 2 fraction digits
    pub average_price: f64,
}

/// Per-category crawl counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlOutcome {
    pub pages_visited: usize,
    pub links_seen: usize,
    pub records_written: usize,
    pub products_skipped: usize,
    pub image_failures: usize,
    pub write_failures: usize,
}

/// Round to 2 fraction digits
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category("Historical Fiction"), "historicalfiction");
        assert_eq!(normalize_category("\n    Travel\n  "), "travel");
        assert_eq!(normalize_category("Sequential Art"), "sequentialart");
    }

    #[test]
    fn test_normalize_category_is_idempotent() {
        for raw in ["Historical Fiction", "  Add a comment ", "Self Help", "travel", ""] {
            let once = normalize_category(raw);
            assert_eq!(normalize_category(&once), once);
        }
    }

    #[test]
    fn test_price_parsing_strips_symbol_and_artifact() {
        assert_eq!("£51.77".parse::<Price>().unwrap().pence(), 5177);
        assert_eq!("Â£51.77".parse::<Price>().unwrap().pence(), 5177);
        assert_eq!("  £ 10 ".parse::<Price>().unwrap().pence(), 1000);
        assert_eq!("13.99".parse::<Price>().unwrap().as_f64(), 13.99);
        assert_eq!("£7.5".parse::<Price>().unwrap().pence(), 750);
    }

    #[test]
    fn test_price_parsing_rejects_garbage() {
        for raw in [
            "", "£", "£abc", "free", "£-1.00", "£NaN", "£1e2", "£1e30", "£inf", "£1.999", "£.50", "£5.",
            "£1,000.00", "£184467440737095516.16", "£99999999999999999999",
        ] {
            match raw.parse::<Price>() {
                Err(ScrapeError::MalformedPrice { raw: r }) => assert_eq!(r, raw),
                other => panic!("expected MalformedPrice for {:?}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn test_price_display_is_currency_tagged() {
        assert_eq!(Price::from_pence(5177).to_string(), "£51.77");
        assert_eq!(Price::from_pence(1005).to_string(), "£10.05");
        assert_eq!(Price::from_pence(0).to_string(), "£0.00");
    }

    #[test]
    fn test_rating_words() {
        assert_eq!("Three".parse::<Rating>().unwrap(), Rating::Three);
        assert_eq!(Rating::One.to_string(), "One");
        assert!(matches!("Six".parse::<Rating>(), Err(ScrapeError::StructuralMismatch { .. })));
        assert!("three".parse::<Rating>().is_err());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(20.0), 20.0);
        assert_eq!(round2(10.005_1), 10.01);
        assert_eq!(round2(33.333_333), 33.33);
    }
}
