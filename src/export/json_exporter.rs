use anyhow::Result;
use serde::Serialize;
use serde_json::to_writer_pretty;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

use super::report::{ChartSeries, ReportSummary};
use super::InternalExportStats;
use crate::models::CategoryStatsMap;

/// Everything a report renderer needs, in one document
#[derive(Debug, Serialize)]
pub struct SummaryDocument<'a> {
    pub generated_at: String,
    pub stats: &'a CategoryStatsMap,
    pub summary: ReportSummary,
    pub charts: ChartSeries,
}

/// Export the summary document with pretty formatting
pub async fn export_json(document: &SummaryDocument<'_>, output_path: &Path) -> Result<InternalExportStats> {
    debug!("Exporting {} categories to JSON: {}", document.stats.len(), output_path.display());

    let file = File::create(output_path)?;
    to_writer_pretty(file, document)?;

    let file_size = tokio::fs::metadata(output_path).await?.len();

    info!("JSON export completed: {} bytes", file_size);

    Ok(InternalExportStats {
        file_size_bytes: file_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryStats;

    #[tokio::test]
    async fn test_export_json() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("summary.json");

        let mut stats = CategoryStatsMap::new();
        stats.insert("travel".to_string(), CategoryStats { count: 11, average_price: 39.79 });
        stats.insert("mystery".to_string(), CategoryStats { count: 32, average_price: 31.72 });

        let document = SummaryDocument {
            generated_at: "2024-01-01T00:00:00Z".to_string(),
            stats: &stats,
            summary: ReportSummary::from_stats(&stats),
            charts: ChartSeries::from_stats(&stats, 12),
        };
        export_json(&document, &path).await.unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["stats"]["travel"]["count"], 11);
        assert_eq!(value["summary"]["most_records"], "mystery");
        assert_eq!(value["charts"]["counts"][1]["name"], "other");
        assert_eq!(value["charts"]["counts"][1]["count"], 11);
        assert_eq!(value["charts"]["averages"].as_array().unwrap().len(), 2);
        assert_eq!(value["stats"].as_object().unwrap().len(), 2);
    }
}
