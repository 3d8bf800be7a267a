//! Values the report and charts are built from.

use serde::{Deserialize, Serialize};

use crate::models::{round2, CategoryStatsMap};

/// Label of the bucket that small categories fold into. A category that
/// itself normalizes to this name is counted in the bucket too.
pub const OTHER_LABEL: &str = "other";

/// Headline figures of the price report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Category with the most records
    pub most_records: Option<String>,
    /// Category with the highest average price
    pub highest_average: Option<String>,
    /// Mean of the per-category averages, rounded to 2 digits
    pub overall_average: f64,
}

impl ReportSummary {
    /// Ties go to the category discovered first
    pub fn from_stats(stats: &CategoryStatsMap) -> Self {
        let mut most_records: Option<(&String, usize)> = None;
        let mut highest_average: Option<(&String, f64)> = None;

        for (name, entry) in stats {
            if most_records.map_or(true, |(_, count)| entry.count > count) {
                most_records = Some((name, entry.count));
            }
            if highest_average.map_or(true, |(_, average)| entry.average_price > average) {
                highest_average = Some((name, entry.average_price));
            }
        }

        let overall_average = if stats.is_empty() {
            0.0
        } else {
            round2(stats.values().map(|s| s.average_price).sum::<f64>() / stats.len() as f64)
        };

        Self {
            most_records: most_records.map(|(name, _)| name.clone()),
            highest_average: highest_average.map(|(name, _)| name.clone()),
            overall_average,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountPoint {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AveragePoint {
    pub name: String,
    pub average_price: f64,
}

/// Series behind the share-of-records pie and the average-price bars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Categories above the threshold in order, then a single trailing `other`
    pub counts: Vec<CountPoint>,
    pub averages: Vec<AveragePoint>,
}

impl ChartSeries {
    pub fn from_stats(stats: &CategoryStatsMap, other_threshold: usize) -> Self {
        let mut counts = Vec::new();
        let mut other = 0;
        for (name, entry) in stats {
            if entry.count <= other_threshold || name == OTHER_LABEL {
                other += entry.count;
            } else {
                counts.push(CountPoint {
                    name: name.clone(),
                    count: entry.count,
                });
            }
        }
        counts.push(CountPoint {
            name: OTHER_LABEL.to_string(),
            count: other,
        });

        let averages = stats
            .iter()
            .map(|(name, entry)| AveragePoint {
                name: name.clone(),
                average_price: entry.average_price,
            })
            .collect();

        Self { counts, averages }
    }
}
