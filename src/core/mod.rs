use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

pub mod orchestrator;
pub mod pipeline;

pub use orchestrator::Orchestrator;
pub use pipeline::CategoryCrawler;

use crate::config::AppConfig;
use crate::export::{ExportManager, ExportStats};
use crate::models::CategoryStatsMap;
use crate::scraper::http_client::HttpPerformanceStats;
use crate::scraper::HttpClient;
use crate::storage::DatasetStore;

/// Core application state
pub struct ShelfScrape {
    config: AppConfig,
    http_client: Arc<HttpClient>,
    store: DatasetStore,
    export_manager: ExportManager,
}

impl ShelfScrape {
    /// Initialize the HTTP client, dataset store and exporter
    pub fn new(config: AppConfig) -> Result<Self> {
        info!("Initializing shelfscrape core");

        let http_client = Arc::new(HttpClient::new(&config.scraping)?);
        let store = DatasetStore::new(config.output.datasets_path());
        let export_manager = ExportManager::new(&config.output);

        Ok(Self {
            config,
            http_client,
            store,
            export_manager,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Full site crawl; returns stats per category in discovery order
    pub async fn crawl_all(&self) -> Result<CategoryStatsMap> {
        let orchestrator = Orchestrator::new(self.http_client.clone(), self.config.clone())?;
        Ok(orchestrator.crawl_all().await?)
    }

    /// Aggregate existing datasets without crawling; categories that have
    /// no readable dataset are logged and left out
    pub fn aggregate(&self, categories: &[String]) -> CategoryStatsMap {
        let aggregator = self.store.aggregator();
        let mut stats = CategoryStatsMap::new();

        for category in categories {
            match aggregator.aggregate(category) {
                Ok(entry) => {
                    stats.insert(category.clone(), entry);
                }
                Err(e) => warn!("Skipping {}: {}", category, e),
            }
        }
        stats
    }

    /// Aggregate every dataset already on disk
    pub fn aggregate_existing(&self) -> Result<CategoryStatsMap> {
        let categories = self.store.list_categories()?;
        info!("Aggregating {} existing datasets", categories.len());
        Ok(self.aggregate(&categories))
    }

    pub async fn export(&self, stats: &CategoryStatsMap) -> Result<Vec<ExportStats>> {
        self.export_manager.export_all(stats).await
    }

    pub async fn http_stats(&self) -> HttpPerformanceStats {
        self.http_client.get_performance_stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryStats, DATASET_HEADER};

    fn app(root: &std::path::Path) -> ShelfScrape {
        let mut config = AppConfig::default();
        config.output.root = root.to_path_buf();
        ShelfScrape::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_aggregate_existing_datasets() {
        let temp = tempfile::tempdir().unwrap();
        let app = app(temp.path());
        let csv_dir = temp.path().join("csv");
        std::fs::create_dir_all(&csv_dir).unwrap();

        let header = DATASET_HEADER.join(",");
        std::fs::write(
            csv_dir.join("travel.csv"),
            format!("{}\nu,a,t,£10.00,£10.00,1,,travel,One,i\nu,b,t,£30.00,£30.00,1,,travel,Two,i\n", header),
        )
        .unwrap();
        std::fs::write(csv_dir.join("poetry.csv"), format!("{}\n", header)).unwrap();

        let stats = app.aggregate_existing().unwrap();
        let keys: Vec<&str> = stats.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["poetry", "travel"]);
        assert_eq!(stats["travel"], CategoryStats { count: 2, average_price: 20.0 });
        assert_eq!(stats["poetry"].count, 0);

        let partial = app.aggregate(&["travel".to_string(), "missing".to_string()]);
        assert_eq!(partial.len(), 1);

        let exported = app.export(&stats).await.unwrap();
        assert_eq!(exported.len(), 2);
    }

    #[tokio::test]
    async fn test_no_datasets_yet() {
        let temp = tempfile::tempdir().unwrap();
        let app = app(temp.path());
        assert!(app.aggregate_existing().unwrap().is_empty());
        assert_eq!(app.http_stats().await.total_requests, 0);
    }
}
