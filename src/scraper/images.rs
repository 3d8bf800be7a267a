use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use super::Fetch;
use crate::error::{ScrapeError, ScrapeResult};
use crate::utils::file_utils::FileUtils;
use crate::utils::string_utils::StringUtils;

const DEFAULT_IMAGE_EXTENSION: &str = "jpg";

/// Downloads cover images into `<images_root>/<category>/<title>.<ext>`
pub struct ImageFetcher {
    fetcher: Arc<dyn Fetch>,
    images_root: PathBuf,
}

impl ImageFetcher {
    pub fn new(fetcher: Arc<dyn Fetch>, images_root: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            images_root: images_root.into(),
        }
    }

    pub fn category_dir(&self, category: &str) -> PathBuf {
        self.images_root.join(StringUtils::safe_segment(category))
    }

    /// Deterministic destination for a product's cover
    pub fn destination(&self, image_url: &Url, title: &str, category: &str) -> PathBuf {
        let extension = StringUtils::url_extension(image_url).unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.to_string());
        self.category_dir(category)
            .join(format!("{}.{}", StringUtils::image_file_stem(title), extension))
    }

    /// One GET, one write. Failures are returned for the caller to log; no retry.
    pub async fn fetch_image(&self, image_url: &Url, title: &str, category: &str) -> ScrapeResult<PathBuf> {
        FileUtils::ensure_dir(self.category_dir(category)).await?;

        let path = self.destination(image_url, title, category);
        let bytes = self.fetcher.fetch_bytes(image_url).await?;

        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| ScrapeError::io(&path, e))?;

        debug!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StaticSite;

    const COVER: &str = "https://books.toscrape.com/media/cache/fe/72/fe72.jpg";

    #[tokio::test]
    async fn test_fetch_image_writes_under_category() {
        let temp = tempfile::tempdir().unwrap();
        let site = StaticSite::new().with_bytes(COVER, b"\xff\xd8jpeg".to_vec());
        let images = ImageFetcher::new(Arc::new(site), temp.path());

        let url = Url::parse(COVER).unwrap();
        let path = images.fetch_image(&url, "A Light in the Attic", "poetry").await.unwrap();

        assert_eq!(path, temp.path().join("poetry").join("a-light-in-the-attic.jpg"));
        assert_eq!(std::fs::read(&path).unwrap(), b"\xff\xd8jpeg");
    }

    #[tokio::test]
    async fn test_title_with_slash_stays_in_category_dir() {
        let temp = tempfile::tempdir().unwrap();
        let images = ImageFetcher::new(Arc::new(StaticSite::new()), temp.path());

        let url = Url::parse(COVER).unwrap();
        let path = images.destination(&url, "Stories 1800/1849", "sciencefiction");
        assert_eq!(path.parent().unwrap(), temp.path().join("sciencefiction"));
        assert_eq!(path.file_name().unwrap(), "stories-1800-1849.jpg");
    }

    #[tokio::test]
    async fn test_failed_download_is_an_error_but_dir_exists() {
        let temp = tempfile::tempdir().unwrap();
        let site = StaticSite::new().with_status(COVER, 404);
        let images = ImageFetcher::new(Arc::new(site), temp.path());

        let url = Url::parse(COVER).unwrap();
        let err = images.fetch_image(&url, "Missing", "travel").await.unwrap_err();

        assert!(matches!(err, ScrapeError::HttpStatus { status: 404, .. }));
        assert!(temp.path().join("travel").is_dir());
        assert!(!temp.path().join("travel").join("missing.jpg").exists());
    }
}
