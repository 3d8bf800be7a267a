use anyhow::Result;
use csv::WriterBuilder;
use std::path::Path;
use tracing::{debug, info};

use super::InternalExportStats;
use crate::models::CategoryStatsMap;

const STATS_HEADER: [&str; 3] = ["category", "count", "average_price"];

/// Export per-category stats as `category,count,average_price`
pub async fn export_csv(stats: &CategoryStatsMap, output_path: &Path) -> Result<InternalExportStats> {
    debug!("Exporting {} categories to CSV: {}", stats.len(), output_path.display());

    let file = std::fs::File::create(output_path)?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    writer.write_record(STATS_HEADER)?;
    for (name, entry) in stats {
        writer.write_record([
            name.clone(),
            entry.count.to_string(),
            format!("{:.2}", entry.average_price),
        ])?;
    }

    writer.flush()?;
    drop(writer);

    let file_size = tokio::fs::metadata(output_path).await?.len();

    info!("CSV export completed: {} categories, {} bytes", stats.len(), file_size);

    Ok(InternalExportStats {
        file_size_bytes: file_size,
    })
}
