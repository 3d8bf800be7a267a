use async_trait::async_trait;
use reqwest::{header::{HeaderMap, HeaderValue}, Client, Response};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use super::limiter::RequestLimiter;
use super::Fetch;
use crate::config::ScrapingConfig;
use crate::error::{ScrapeError, ScrapeResult};

/// The run's single HTTP client: one connection pool, one timeout policy,
/// one in-flight cap
pub struct HttpClient {
    client: Client,
    limiter: RequestLimiter,
    performance_metrics: RwLock<HttpPerformanceMetrics>,
}

#[derive(Debug, Default)]
struct HttpPerformanceMetrics {
    total_duration: Duration,
    success_count: u64,
    error_count: u64,
    total_bytes_transferred: u64,
}

/// HTTP performance statistics
#[derive(Debug, Clone)]
pub struct HttpPerformanceStats {
    pub total_requests: u64,
    pub success_count: u64,
    pub error_count: u64,
    pub avg_response_time: Duration,
    pub total_bytes_transferred: u64,
    pub peak_in_flight: usize,
}

impl HttpClient {
    pub fn new(config: &ScrapingConfig) -> ScrapeResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("text/html,application/xhtml+xml,image/webp,*/*;q=0.8"));
        headers.insert("Accept-Language", HeaderValue::from_static("en-US,en;q=0.5"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10))
            .pool_max_idle_per_host(config.max_concurrent_requests)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| ScrapeError::config(format!("HTTP client could not be built: {}", e)))?;

        info!(
            "HTTP client initialized (timeout {}s, max {} in flight)",
            config.request_timeout_seconds, config.max_concurrent_requests
        );

        Ok(Self {
            client,
            limiter: RequestLimiter::new(config.max_concurrent_requests),
            performance_metrics: RwLock::new(HttpPerformanceMetrics::default()),
        })
    }

    /// One GET; any non-success status becomes `HttpStatus`
    async fn get(&self, url: &Url) -> ScrapeResult<Response> {
        debug!("HTTP GET {}", url);

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| ScrapeError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("HTTP {} for {}", status.as_u16(), url);
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    async fn record_request_metrics(&self, duration: Duration, success: bool, bytes: u64) {
        let mut metrics = self.performance_metrics.write().await;
        metrics.total_duration += duration;
        if success {
            metrics.success_count += 1;
        } else {
            metrics.error_count += 1;
        }
        metrics.total_bytes_transferred += bytes;
    }

    /// Get performance statistics
    pub async fn get_performance_stats(&self) -> HttpPerformanceStats {
        let metrics = self.performance_metrics.read().await;
        let total_requests = metrics.success_count + metrics.error_count;

        let avg_response_time = if total_requests > 0 {
            metrics.total_duration / total_requests as u32
        } else {
            Duration::from_secs(0)
        };

        HttpPerformanceStats {
            total_requests,
            success_count: metrics.success_count,
            error_count: metrics.error_count,
            avg_response_time,
            total_bytes_transferred: metrics.total_bytes_transferred,
            peak_in_flight: self.limiter.peak(),
        }
    }
}

#[async_trait]
impl Fetch for HttpClient {
    async fn fetch_text(&self, url: &Url) -> ScrapeResult<String> {
        let _permit = self.limiter.acquire().await?;
        let start_time = Instant::now();

        let result = match self.get(url).await {
            Ok(response) => response
                .text()
                .await
                .map_err(|e| ScrapeError::from_reqwest(url.as_str(), e)),
            Err(e) => Err(e),
        };

        let bytes = result.as_ref().map(|body| body.len() as u64).unwrap_or(0);
        self.record_request_metrics(start_time.elapsed(), result.is_ok(), bytes).await;
        result
    }

    async fn fetch_bytes(&self, url: &Url) -> ScrapeResult<Vec<u8>> {
        let _permit = self.limiter.acquire().await?;
        let start_time = Instant::now();

        let result = match self.get(url).await {
            Ok(response) => response
                .bytes()
                .await
                .map(|body| body.to_vec())
                .map_err(|e| ScrapeError::from_reqwest(url.as_str(), e)),
            Err(e) => Err(e),
        };

        let bytes = result.as_ref().map(|body| body.len() as u64).unwrap_or(0);
        self.record_request_metrics(start_time.elapsed(), result.is_ok(), bytes).await;
        result
    }
}
