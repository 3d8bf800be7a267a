use std::path::Path;
use tracing::info;

use crate::error::{ScrapeError, ScrapeResult};

/// File utility functions
pub struct FileUtils;

impl FileUtils {
    /// Check if file exists and is readable
    pub fn is_readable<P: AsRef<Path>>(path: P) -> bool {
        let path = path.as_ref();
        path.exists() && path.is_file()
    }

    /// Create directory if it doesn't exist; safe to race
    pub async fn ensure_dir<P: AsRef<Path>>(path: P) -> ScrapeResult<()> {
        let path = path.as_ref();
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| ScrapeError::io(path, e))
    }

    /// Remove a directory tree (if present) and recreate it empty
    pub async fn reset_dir<P: AsRef<Path>>(path: P) -> ScrapeResult<()> {
        let path = path.as_ref();
        if path.exists() {
            tokio::fs::remove_dir_all(path)
                .await
                .map_err(|e| ScrapeError::io(path, e))?;
            info!("Removed existing directory: {}", path.display());
        }
        Self::ensure_dir(path).await
    }
}
