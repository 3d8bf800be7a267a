use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::logging::LoggingConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub scraping: ScrapingConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Root of the catalog; category, product and image links resolve against it
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    pub max_concurrent_requests: usize,
    pub request_timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
    /// Detail pages processed at once within one listing page
    pub page_concurrency: usize,
    /// Categories crawled at once
    pub category_concurrency: usize,
    pub user_agent: String,
    pub download_images: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub root: PathBuf,
    pub datasets_dir: String,
    pub images_dir: String,
    /// Wipe datasets and images before a crawl
    pub clean_on_start: bool,
    /// Categories at or below this count are folded into "other" in chart series
    pub other_threshold: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://books.toscrape.com/".to_string(),
        }
    }
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 8,
            request_timeout_seconds: 30,
            connect_timeout_seconds: 10,
            page_concurrency: 4,
            category_concurrency: 2,
            user_agent: format!("shelfscrape/{}", env!("CARGO_PKG_VERSION")),
            download_images: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("output"),
            datasets_dir: "csv".to_string(),
            images_dir: "images".to_string(),
            clean_on_start: true,
            other_threshold: 12,
        }
    }
}

impl OutputConfig {
    pub fn datasets_path(&self) -> PathBuf {
        self.root.join(&self.datasets_dir)
    }

    pub fn images_path(&self) -> PathBuf {
        self.root.join(&self.images_dir)
    }
}

impl AppConfig {
    /// Load configuration from default locations
    pub async fn load() -> Result<Self> {
        let config_path = get_config_path();

        if config_path.exists() {
            return Self::load_from_file(&config_path).await;
        }

        info!("No configuration file found, using defaults");
        let mut config = Self::default();
        ConfigOverrides::apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from specific file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let mut config: AppConfig = toml::from_str(&content)?;

        ConfigOverrides::apply(&mut config);
        config.validate()?;

        info!("Configuration loaded from: {}", path.display());
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.site.base_url)
            .map_err(|e| anyhow::anyhow!("Site base_url '{}' is not a valid URL: {}", self.site.base_url, e))?;
        if base.cannot_be_a_base() {
            return Err(anyhow::anyhow!("Site base_url '{}' cannot be used as a base", self.site.base_url));
        }

        if self.scraping.max_concurrent_requests == 0 {
            return Err(anyhow::anyhow!("Scraping max_concurrent_requests must be > 0"));
        }

        if self.scraping.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("Scraping request_timeout_seconds must be > 0"));
        }

        if self.scraping.page_concurrency == 0 || self.scraping.category_concurrency == 0 {
            return Err(anyhow::anyhow!("Scraping page_concurrency and category_concurrency must be > 0"));
        }

        if self.output.datasets_dir.is_empty() || self.output.images_dir.is_empty() {
            return Err(anyhow::anyhow!("Output datasets_dir and images_dir must not be empty"));
        }

        if self.output.datasets_dir == self.output.images_dir {
            return Err(anyhow::anyhow!("Output datasets_dir and images_dir must differ"));
        }

        Ok(())
    }

    /// Parsed site root; `validate` guarantees this succeeds
    pub fn base_url(&self) -> Result<url::Url> {
        Ok(url::Url::parse(&self.site.base_url)?)
    }
}

/// Get the configuration file path
fn get_config_path() -> PathBuf {
    let local = PathBuf::from("shelfscrape.toml");
    if local.exists() {
        return local;
    }

    directories::ProjectDirs::from("com", "shelfscrape", "shelfscrape")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or(local)
}

/// Environment-based configuration overrides
pub struct ConfigOverrides;

impl ConfigOverrides {
    /// Apply environment variable overrides to configuration
    pub fn apply(config: &mut AppConfig) {
        if let Ok(base_url) = std::env::var("SHELF_BASE_URL") {
            config.site.base_url = base_url;
        }

        if let Ok(root) = std::env::var("SHELF_OUTPUT_ROOT") {
            config.output.root = PathBuf::from(root);
        }

        if let Ok(concurrent_str) = std::env::var("SHELF_MAX_CONCURRENT") {
            if let Ok(concurrent) = concurrent_str.parse::<usize>() {
                config.scraping.max_concurrent_requests = concurrent;
            }
        }

        if let Ok(timeout_str) = std::env::var("SHELF_REQUEST_TIMEOUT") {
            if let Ok(timeout) = timeout_str.parse::<u64>() {
                config.scraping.request_timeout_seconds = timeout;
            }
        }

        if let Ok(images_str) = std::env::var("SHELF_DOWNLOAD_IMAGES") {
            config.scraping.download_images = images_str.to_lowercase() == "true";
        }

        if let Ok(log_level) = std::env::var("SHELF_LOG_LEVEL") {
            config.logging.level = log_level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.output.datasets_path(), PathBuf::from("output").join("csv"));
        assert_eq!(config.output.images_path(), PathBuf::from("output").join("images"));
    }

    #[test]
    fn test_validation_rejects_zero_concurrency() {
        let mut config = AppConfig::default();
        config.scraping.max_concurrent_requests = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_base_url() {
        let mut config = AppConfig::default();
        config.site.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [scraping]
            max_concurrent_requests = 2

            [output]
            root = "/tmp/books"
            "#,
        )
        .unwrap();

        assert_eq!(config.scraping.max_concurrent_requests, 2);
        assert_eq!(config.scraping.request_timeout_seconds, 30);
        assert_eq!(config.output.root, PathBuf::from("/tmp/books"));
        assert_eq!(config.output.datasets_dir, "csv");
        assert_eq!(config.site.base_url, "https://books.toscrape.com/");
    }
}
