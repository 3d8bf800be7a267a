use csv::ReaderBuilder;
use tracing::{debug, warn};

use super::DatasetStore;
use crate::error::{ScrapeError, ScrapeResult};
use crate::models::{round2, CategoryStats, Price, DATASET_HEADER, PRICE_INCLUDING_TAX_COLUMN};
use crate::utils::file_utils::FileUtils;

/// Running mean updated one sample at a time:
/// `mean_i = mean_{i-1} + (x_i - mean_{i-1}) / i`
#[derive(Debug, Clone, Copy, Default)]
pub struct IncrementalMean {
    count: usize,
    mean: f64,
}

impl IncrementalMean {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.mean += (value - self.mean) / self.count as f64;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean rounded to 2 fraction digits; 0.0 before any sample
    pub fn mean(&self) -> f64 {
        round2(self.mean)
    }
}

/// Computes [`CategoryStats`] from a persisted category dataset
#[derive(Debug, Clone)]
pub struct Aggregator {
    store: DatasetStore,
}

impl Aggregator {
    pub fn new(store: DatasetStore) -> Self {
        Self { store }
    }

    pub fn aggregate(&self, category: &str) -> ScrapeResult<CategoryStats> {
        let path = self.store.dataset_path(category);
        if !FileUtils::is_readable(&path) {
            return Err(ScrapeError::DatasetNotFound {
                category: category.to_string(),
            });
        }

        // Header rows are recognised by value wherever they appear
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .map_err(|e| ScrapeError::csv(&path, e))?;

        let sentinel = DATASET_HEADER[PRICE_INCLUDING_TAX_COLUMN].as_bytes();
        let mut mean = IncrementalMean::new();

        // Byte records: only the price cell has to be valid UTF-8
        for (line, row) in reader.byte_records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!("{}: row {} unreadable, skipping: {}", category, line + 1, e);
                    continue;
                }
            };
            let Some(raw) = row.get(PRICE_INCLUDING_TAX_COLUMN) else {
                warn!("{}: row {} has no price column, skipping", category, line + 1);
                continue;
            };
            if raw == sentinel {
                continue;
            }

            let parsed = std::str::from_utf8(raw)
                .map_err(|_| ScrapeError::MalformedPrice {
                    raw: String::from_utf8_lossy(raw).into_owned(),
                })
                .and_then(str::parse::<Price>);
            match parsed {
                Ok(price) => mean.push(price.as_f64()),
                Err(e) => warn!("{}: row {} skipped: {}", category, line + 1, e),
            }
        }

        let stats = CategoryStats {
            count: mean.count(),
            average_price: mean.mean(),
        };
        debug!("{}: {} records, average {:.2}", category, stats.count, stats.average_price);
        Ok(stats)
    }
}
