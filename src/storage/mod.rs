use std::path::{Path, PathBuf};
use tracing::debug;

pub mod aggregate;
pub mod dataset;

pub use aggregate::{Aggregator, IncrementalMean};
pub use dataset::DatasetWriter;

use crate::error::{ScrapeError, ScrapeResult};
use crate::utils::string_utils::StringUtils;

const DATASET_EXTENSION: &str = "csv";

/// Directory holding one CSV dataset per category, keyed by category name
#[derive(Debug, Clone)]
pub struct DatasetStore {
    root: PathBuf,
}

impl DatasetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dataset_path(&self, category: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", StringUtils::safe_segment(category), DATASET_EXTENSION))
    }

    /// Categories that already have a dataset on disk, sorted by name.
    /// A missing directory simply has none.
    pub fn list_categories(&self) -> ScrapeResult<Vec<String>> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ScrapeError::io(&self.root, e)),
        };

        let mut categories = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| ScrapeError::io(&self.root, e))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DATASET_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                categories.push(stem.to_string());
            }
        }

        categories.sort();
        debug!("Found {} datasets in {}", categories.len(), self.root.display());
        Ok(categories)
    }

    pub fn writer(&self) -> DatasetWriter {
        DatasetWriter::new(self.clone())
    }

    pub fn aggregator(&self) -> Aggregator {
        Aggregator::new(self.clone())
    }
}
