//! Query result models.
//!
//! Rows cross the data client boundary as JSON objects so the remote
//! database and the local SQLite backend look the same to callers.

use cfd_core::{DamageCategory, DashboardError};
use serde::Serialize;

/// One result row: column name to value.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Count of damage points for one category.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct CategoryCount {
    pub category: DamageCategory,
    pub count: u64,
}

impl CategoryCount {
    /// Decode `key0` / `val` rows from a count query.
    ///
    /// Rows with unknown or null categories are dropped with a warning. The
    /// result is sorted by count descending, ties in severity order.
    pub fn from_rows(rows: &[Row]) -> Result<Vec<CategoryCount>, DashboardError> {
        let mut counts = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(key) = row.get("key0").and_then(|v| v.as_str()) else {
                log::warn!("[CFD Debug] models: skipping count row without key0: {:?}", row);
                continue;
            };
            let Some(category) = DamageCategory::from_key(key) else {
                log::warn!("[CFD Debug] models: skipping unknown damage category '{}'", key);
                continue;
            };
            let count = match row.get("val") {
                Some(serde_json::Value::Null) | None => 0,
                Some(v) => v
                    .as_u64()
                    .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
                    .ok_or_else(|| {
                        DashboardError::QueryExecution(format!("non-numeric count for {}: {}", key, v))
                    })?,
            };
            counts.push(CategoryCount { category, count });
        }
        counts.sort_by(|a, b| b.count.cmp(&a.count).then(a.category.cmp(&b.category)));
        Ok(counts)
    }
}

/// Summary statistics of the NDVI values inside a viewport.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct HeatmapStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation.
    pub stddev: f64,
}

impl HeatmapStats {
    /// Compute statistics over non-NaN values; `None` when there are none.
    pub fn from_values(values: &[f64]) -> Option<HeatmapStats> {
        let values: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let stddev = if values.len() > 1 {
            let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (sum_sq / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        Some(HeatmapStats {
            min,
            max,
            mean,
            stddev,
        })
    }

    /// Color domain clamped to two standard deviations around the mean.
    ///
    /// Returns `[max(min, mean - 2σ), min(max, mean + 2σ)]` so a handful of
    /// outliers cannot squeeze every bin into one color.
    pub fn quantize_domain(&self) -> [f64; 2] {
        [
            self.min.max(self.mean - 2.0 * self.stddev),
            self.max.min(self.mean + 2.0 * self.stddev),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn decodes_and_sorts_counts() {
        let rows = vec![
            row(json!({"key0": "Other", "val": 3})),
            row(json!({"key0": "Destroyed (>50%)", "val": 120})),
            row(json!({"key0": "Minor (10-25%)", "val": 3.0})),
            row(json!({"key0": "Major (26-50%)", "val": null})),
        ];
        let counts = CategoryCount::from_rows(&rows).unwrap();
        assert_eq!(counts[0].category, DamageCategory::Destroyed);
        assert_eq!(counts[0].count, 120);
        assert_eq!(counts[1].category, DamageCategory::Minor);
        assert_eq!(counts[2].category, DamageCategory::Other);
        assert_eq!(counts[3].count, 0);
    }

    #[test]
    fn skips_unknown_categories() {
        let rows = vec![
            row(json!({"key0": "Mystery", "val": 1})),
            row(json!({"key0": null, "val": 9})),
        ];
        assert!(CategoryCount::from_rows(&rows).unwrap().is_empty());
    }

    #[test]
    fn rejects_non_numeric_counts() {
        let rows = vec![row(json!({"key0": "Other", "val": "lots"}))];
        assert!(CategoryCount::from_rows(&rows).is_err());
    }

    #[test]
    fn clamps_quantize_domain_to_two_sigma() {
        let stats = HeatmapStats {
            min: 0.0,
            max: 50.0,
            mean: 10.0,
            stddev: 1.0,
        };
        assert_eq!(stats.quantize_domain(), [8.0, 12.0]);
    }

    #[test]
    fn keeps_data_range_when_narrower_than_two_sigma() {
        let stats = HeatmapStats {
            min: 9.5,
            max: 10.5,
            mean: 10.0,
            stddev: 1.0,
        };
        assert_eq!(stats.quantize_domain(), [9.5, 10.5]);
    }

    #[test]
    fn computes_stats_from_values() {
        let stats = HeatmapStats::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        assert_eq!(stats.mean, 5.0);
        assert!((stats.stddev - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);

        assert!(HeatmapStats::from_values(&[]).is_none());
        assert_eq!(HeatmapStats::from_values(&[0.4]).unwrap().stddev, 0.0);
    }
}
