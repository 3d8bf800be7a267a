use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{error, info};

pub mod csv_exporter;
pub mod json_exporter;
pub mod report;

pub use report::{AveragePoint, ChartSeries, CountPoint, ReportSummary};

use crate::config::OutputConfig;
use crate::models::CategoryStatsMap;
use json_exporter::SummaryDocument;

/// Writes the aggregated stats next to the datasets
pub struct ExportManager {
    output_root: PathBuf,
    other_threshold: usize,
}

/// Export format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Json => write!(f, "json"),
        }
    }
}

/// Export statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportStats {
    pub format: ExportFormat,
    pub file_path: PathBuf,
    pub record_count: usize,
    pub file_size_bytes: u64,
    pub export_duration_ms: u64,
}

/// What a single exporter reports back
pub struct InternalExportStats {
    pub file_size_bytes: u64,
}

impl ExportManager {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            output_root: config.root.clone(),
            other_threshold: config.other_threshold,
        }
    }

    /// Write `stats.csv` and `summary.json` under the output root. A failing
    /// format is logged and the other still written.
    pub async fn export_all(&self, stats: &CategoryStatsMap) -> Result<Vec<ExportStats>> {
        std::fs::create_dir_all(&self.output_root)?;

        let mut all_stats = Vec::new();
        for format in [ExportFormat::Csv, ExportFormat::Json] {
            match self.export(stats, format).await {
                Ok(result) => all_stats.push(result),
                Err(e) => error!("Failed to export to {}: {}", format, e),
            }
        }

        Ok(all_stats)
    }

    /// Export in one format
    pub async fn export(&self, stats: &CategoryStatsMap, format: ExportFormat) -> Result<ExportStats> {
        let start_time = std::time::Instant::now();
        let output_path = self.output_path(format);

        let result = match format {
            ExportFormat::Csv => csv_exporter::export_csv(stats, &output_path).await?,
            ExportFormat::Json => {
                let document = SummaryDocument {
                    generated_at: crate::utils::current_timestamp(),
                    stats,
                    summary: ReportSummary::from_stats(stats),
                    charts: ChartSeries::from_stats(stats, self.other_threshold),
                };
                json_exporter::export_json(&document, &output_path).await?
            }
        };

        let final_stats = ExportStats {
            format,
            file_path: output_path,
            record_count: stats.len(),
            file_size_bytes: result.file_size_bytes,
            export_duration_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "Export completed: {} categories to {} in {}ms",
            final_stats.record_count,
            final_stats.file_path.display(),
            final_stats.export_duration_ms
        );

        Ok(final_stats)
    }

    fn output_path(&self, format: ExportFormat) -> PathBuf {
        match format {
            ExportFormat::Csv => self.output_root.join("stats.csv"),
            ExportFormat::Json => self.output_root.join("summary.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryStats;

    #[tokio::test]
    async fn test_export_all_writes_both_files() {
        let temp = tempfile::tempdir().unwrap();
        let config = OutputConfig {
            root: temp.path().join("out"),
            ..Default::default()
        };
        let manager = ExportManager::new(&config);

        let mut stats = CategoryStatsMap::new();
        stats.insert("travel".to_string(), CategoryStats { count: 11, average_price: 39.79 });

        let results = manager.export_all(&stats).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].format, ExportFormat::Csv);
        assert!(temp.path().join("out").join("stats.csv").is_file());
        assert!(temp.path().join("out").join("summary.json").is_file());
        assert!(results.iter().all(|r| r.record_count == 1 && r.file_size_bytes > 0));
    }
}
