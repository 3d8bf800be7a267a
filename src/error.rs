use std::path::PathBuf;
use thiserror::Error;

/// Error taxonomy for the crawl-and-aggregate pipeline
#[derive(Error, Debug)]
pub enum ScrapeError {
    // Network errors
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP request failed: {url} - {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request timed out: {url}")]
    Timeout { url: String },

    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    // Extraction errors
    #[error("Structural mismatch: {what}")]
    StructuralMismatch { what: String },

    #[error("Malformed price: '{raw}'")]
    MalformedPrice { raw: String },

    #[error("Malformed availability: '{raw}'")]
    MalformedAvailability { raw: String },

    // Storage errors
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Dataset not found for category: {category}")]
    DatasetNotFound { category: String },

    // Setup errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl ScrapeError {
    pub fn structural(what: impl Into<String>) -> Self {
        Self::StructuralMismatch { what: what.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv { path: path.into(), source }
    }

    /// Map a reqwest failure onto the network buckets
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { url: url.to_string() }
        } else if let Some(status) = err.status() {
            Self::HttpStatus { url: url.to_string(), status: status.as_u16() }
        } else {
            Self::Network { url: url.to_string(), message: err.to_string() }
        }
    }

    /// Only an unusable setup stops a run; everything else is contained per item
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Network { .. } | Self::HttpStatus { .. } | Self::Timeout { .. } | Self::InvalidUrl { .. } => "network",
            Self::StructuralMismatch { .. } | Self::MalformedPrice { .. } | Self::MalformedAvailability { .. } => "extraction",
            Self::Io { .. } | Self::Csv { .. } => "io",
            Self::DatasetNotFound { .. } => "dataset",
            Self::Configuration { .. } => "configuration",
        }
    }
}

/// Result type alias for pipeline operations
pub type ScrapeResult<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let error = ScrapeError::structural("missing <h1>");
        assert_eq!(error.category(), "extraction");
        assert!(!error.is_fatal());

        let error = ScrapeError::HttpStatus { url: "https://example.com".to_string(), status: 404 };
        assert_eq!(error.category(), "network");
        assert!(error.to_string().contains("404"));
    }

    #[test]
    fn test_only_configuration_is_fatal() {
        assert!(ScrapeError::config("output root not creatable").is_fatal());
        assert!(!ScrapeError::DatasetNotFound { category: "travel".to_string() }.is_fatal());
        assert!(!ScrapeError::Timeout { url: "https://example.com".to_string() }.is_fatal());
    }
}
