use csv::WriterBuilder;
use std::fs::OpenOptions;
use tracing::debug;

use super::DatasetStore;
use crate::error::{ScrapeError, ScrapeResult};
use crate::models::{ProductRecord, DATASET_HEADER};

/// Appends product rows to per-category CSV datasets
#[derive(Debug, Clone)]
pub struct DatasetWriter {
    store: DatasetStore,
}

impl DatasetWriter {
    pub fn new(store: DatasetStore) -> Self {
        Self { store }
    }

    /// Append one record; the header goes in first when the file is empty,
    /// so it appears exactly once no matter how many runs append.
    pub fn append(&self, category: &str, record: &ProductRecord) -> ScrapeResult<()> {
        let path = self.store.dataset_path(category);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| ScrapeError::io(&path, e))?;
        let is_empty = file.metadata().map_err(|e| ScrapeError::io(&path, e))?.len() == 0;

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_empty {
            debug!("Creating dataset {}", path.display());
            writer
                .write_record(DATASET_HEADER)
                .map_err(|e| ScrapeError::csv(&path, e))?;
        }

        writer
            .write_record(record.to_row())
            .map_err(|e| ScrapeError::csv(&path, e))?;
        writer.flush().map_err(|e| ScrapeError::io(&path, e))?;

        Ok(())
    }
}
