//! Per-category crawl: listing pages → product pages → dataset rows.

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ScrapeError, ScrapeResult};
use crate::models::{CrawlOutcome, ProductRecord};
use crate::scraper::{resolve, walker, Fetch, ImageFetcher, ProductExtractor};
use crate::storage::DatasetWriter;

/// Result of processing one product link
enum ProductResult {
    Extracted { record: ProductRecord, image_failed: bool },
    Skipped,
}

/// Walks one category's paginated listing and persists every product found
pub struct CategoryCrawler {
    fetcher: Arc<dyn Fetch>,
    extractor: ProductExtractor,
    images: Option<ImageFetcher>,
    writer: DatasetWriter,
    page_concurrency: usize,
}

impl CategoryCrawler {
    pub fn new(
        fetcher: Arc<dyn Fetch>,
        extractor: ProductExtractor,
        images: Option<ImageFetcher>,
        writer: DatasetWriter,
        page_concurrency: usize,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            images,
            writer,
            page_concurrency: page_concurrency.max(1),
        }
    }

    /// Crawl from `start` until a page has no next link, a page cannot be
    /// fetched, or a page repeats. Per-product failures are logged and counted.
    pub async fn crawl(&self, category: &str, start: Url) -> CrawlOutcome {
        let mut outcome = CrawlOutcome::default();
        let mut visited = HashSet::new();
        let mut cursor = Some(start);

        while let Some(page_url) = cursor.take() {
            if !visited.insert(page_url.to_string()) {
                warn!("{}: next link loops back to {}, stopping", category, page_url);
                break;
            }

            let document = match self.fetcher.fetch_text(&page_url).await {
                Ok(document) => document,
                Err(e) => {
                    warn!("{}: listing {} unavailable: {}", category, page_url, e);
                    break;
                }
            };

            let listing = match walker::links(&document) {
                Ok(listing) => listing,
                Err(e) => {
                    warn!("{}: listing {} unreadable: {}", category, page_url, e);
                    break;
                }
            };
            outcome.pages_visited += 1;
            outcome.links_seen += listing.products.len();

            let mut product_urls = Vec::with_capacity(listing.products.len());
            for href in &listing.products {
                match resolve(&page_url, href) {
                    Ok(url) => product_urls.push(url),
                    Err(e) => {
                        warn!("{}: {}", category, e);
                        outcome.products_skipped += 1;
                    }
                }
            }

            // buffered yields in input order, so rows follow the listing
            let results: Vec<ProductResult> = stream::iter(product_urls)
                .map(|url| self.process_product(category, url))
                .buffered(self.page_concurrency)
                .collect()
                .await;

            for result in results {
                match result {
                    ProductResult::Extracted { record, image_failed } => {
                        if image_failed {
                            outcome.image_failures += 1;
                        }
                        match self.writer.append(category, &record) {
                            Ok(()) => outcome.records_written += 1,
                            Err(e) => {
                                warn!("{}: failed to persist '{}': {}", category, record.title, e);
                                outcome.write_failures += 1;
                            }
                        }
                    }
                    ProductResult::Skipped => outcome.products_skipped += 1,
                }
            }

            cursor = match listing.next {
                Some(href) => match walker::next_page_url(&page_url, &href) {
                    Ok(next) => Some(next),
                    Err(e) => {
                        warn!("{}: bad next link on {}: {}", category, page_url, e);
                        None
                    }
                },
                None => None,
            };
        }

        info!(
            "{}: {} pages, {} links, {} written, {} skipped, {} image failures",
            category,
            outcome.pages_visited,
            outcome.links_seen,
            outcome.records_written,
            outcome.products_skipped,
            outcome.image_failures
        );
        outcome
    }

    /// Fetch, extract, download the cover
    async fn process_product(&self, category: &str, url: Url) -> ProductResult {
        let document = match self.fetcher.fetch_text(&url).await {
            Ok(document) => document,
            Err(e) => {
                warn!("{}: product {} unavailable: {}", category, url, e);
                return ProductResult::Skipped;
            }
        };

        let record = match self.extractor.extract(&document, &url) {
            Ok(record) => record,
            Err(e) => {
                warn!("{}: product {} skipped: {}", category, url, e);
                return ProductResult::Skipped;
            }
        };

        if record.category != category {
            debug!("{}: '{}' is filed under '{}' on its own page", category, record.title, record.category);
        }

        let image_failed = match &self.images {
            Some(images) => match self.download_cover(images, category, &record).await {
                Ok(()) => false,
                Err(e) => {
                    warn!("{}: cover for '{}' not saved: {}", category, record.title, e);
                    true
                }
            },
            None => false,
        };

        ProductResult::Extracted { record, image_failed }
    }

    async fn download_cover(&self, images: &ImageFetcher, category: &str, record: &ProductRecord) -> ScrapeResult<()> {
        let image_url = Url::parse(&record.image_url).map_err(|e| ScrapeError::InvalidUrl {
            url: record.image_url.clone(),
            message: e.to_string(),
        })?;
        images.fetch_image(&image_url, &record.title, category).await?;
        Ok(())
    }
}
