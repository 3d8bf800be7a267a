use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use crate::config::AppConfig;
use crate::core::pipeline::CategoryCrawler;
use crate::error::{ScrapeError, ScrapeResult};
use crate::logging::OperationTimer;
use crate::models::{CategoryStats, CategoryStatsMap};
use crate::scraper::{resolve, walker, Fetch, ImageFetcher, ProductExtractor};
use crate::storage::DatasetStore;
use crate::utils::file_utils::FileUtils;

/// Drives a whole-site run: output setup, category discovery, then
/// crawl and aggregate for every category
pub struct Orchestrator {
    fetcher: Arc<dyn Fetch>,
    site_base: Url,
    config: AppConfig,
    store: DatasetStore,
}

impl Orchestrator {
    pub fn new(fetcher: Arc<dyn Fetch>, config: AppConfig) -> ScrapeResult<Self> {
        let site_base = config
            .base_url()
            .map_err(|e| ScrapeError::config(format!("invalid base_url '{}': {}", config.site.base_url, e)))?;
        let store = DatasetStore::new(config.output.datasets_path());

        Ok(Self {
            fetcher,
            site_base,
            config,
            store,
        })
    }

    /// Create the dataset and image directories, wiping them first when
    /// `clean_on_start` is set. Failure here aborts the run.
    pub async fn prepare_output(&self) -> ScrapeResult<()> {
        let output = &self.config.output;
        let mut dirs = vec![output.datasets_path()];
        if self.config.scraping.download_images {
            dirs.push(output.images_path());
        }

        for dir in dirs {
            let result = if output.clean_on_start {
                FileUtils::reset_dir(&dir).await
            } else {
                FileUtils::ensure_dir(&dir).await
            };
            result.map_err(|e| ScrapeError::config(format!("cannot prepare output directory: {}", e)))?;
        }

        info!("Output prepared under {}", output.root.display());
        Ok(())
    }

    /// Crawl every category on the site root and aggregate each dataset.
    ///
    /// The mapping keeps discovery order. A category whose dataset cannot be
    /// aggregated is left out; an unreachable root yields an empty mapping.
    pub async fn crawl_all(&self) -> ScrapeResult<CategoryStatsMap> {
        self.prepare_output().await?;

        let timer = OperationTimer::start("orchestrator", "crawl_all");
        let targets = match self.discover_categories().await {
            Ok(targets) => targets,
            Err(e) => {
                timer.finish_with_error("Category discovery failed", &e);
                return Ok(CategoryStatsMap::new());
            }
        };
        info!("Discovered {} categories", targets.len());

        let crawler = self.crawler();
        let crawler = &crawler;
        let mut results: Vec<(usize, String, Option<CategoryStats>)> = stream::iter(targets.into_iter().enumerate())
            .map(|(index, (name, url))| async move {
                let stats = self.crawl_category(crawler, &name, url).await;
                (index, name, stats)
            })
            .buffer_unordered(self.config.scraping.category_concurrency.max(1))
            .collect()
            .await;

        results.sort_by_key(|(index, _, _)| *index);
        let stats: CategoryStatsMap = results
            .into_iter()
            .filter_map(|(_, name, stats)| stats.map(|stats| (name, stats)))
            .collect();

        timer.finish(&format!("Aggregated {} categories", stats.len()));
        Ok(stats)
    }

    /// Category names and listing URLs in navigation order, duplicates dropped
    async fn discover_categories(&self) -> ScrapeResult<Vec<(String, Url)>> {
        let root = self.fetcher.fetch_text(&self.site_base).await?;
        let links = walker::categories(&root)?;

        let mut seen = HashSet::new();
        let mut targets = Vec::with_capacity(links.len());
        for link in links {
            if !seen.insert(link.name.clone()) {
                warn!("Category '{}' listed twice, keeping the first entry", link.name);
                continue;
            }
            match resolve(&self.site_base, &link.href) {
                Ok(url) => targets.push((link.name, url)),
                Err(e) => warn!("Category '{}' skipped: {}", link.name, e),
            }
        }
        Ok(targets)
    }

    async fn crawl_category(&self, crawler: &CategoryCrawler, name: &str, url: Url) -> Option<CategoryStats> {
        let timer = OperationTimer::start("crawler", name);
        let outcome = crawler.crawl(name, url).await;

        match self.store.aggregator().aggregate(name) {
            Ok(stats) => {
                timer.finish(&format!(
                    "{} records, average {:.2} ({} pages, {} skipped)",
                    stats.count, stats.average_price, outcome.pages_visited, outcome.products_skipped
                ));
                Some(stats)
            }
            Err(e) => {
                timer.finish_with_error("Category left out of results", &e);
                None
            }
        }
    }

    fn crawler(&self) -> CategoryCrawler {
        let images = self
            .config
            .scraping
            .download_images
            .then(|| ImageFetcher::new(self.fetcher.clone(), self.config.output.images_path()));

        CategoryCrawler::new(
            self.fetcher.clone(),
            ProductExtractor::new(self.site_base.clone()),
            images,
            self.store.writer(),
            self.config.scraping.page_concurrency,
        )
    }
}
