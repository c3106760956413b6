//! Evaluation metric pivot.
//!
//! Stored model metrics arrive flat, keyed like `training_accuracy` or
//! `holdout_f1_measure`. The pivot splits each key at its first underscore
//! into a group (the prefix) and a metric name (the rest), yielding one row
//! per metric with one column per group for side-by-side comparison.

use crate::error::VizError;

#[derive(Debug, Clone, PartialEq)]
pub struct MetricPivot {
    /// Group columns in first-seen order.
    pub groups: Vec<String>,
    /// Metric rows in first-seen order.
    pub rows: Vec<MetricRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub metric: String,
    /// One slot per group, `None` where the group never reported this metric.
    pub values: Vec<Option<f64>>,
}

impl MetricPivot {
    pub fn value(&self, metric: &str, group: &str) -> Option<f64> {
        let col = self.groups.iter().position(|g| g == group)?;
        let row = self.rows.iter().find(|r| r.metric == metric)?;
        row.values[col]
    }
}

/// Pivots flat metric keys into a groups-by-metrics grid. Keys with no
/// underscore, or with an empty half on either side of it, carry no group
/// information and are skipped. If nothing splits, the input is treated as
/// empty.
pub fn pivot_metrics(flat: &[(String, f64)]) -> Result<MetricPivot, VizError> {
    if flat.is_empty() {
        return Err(VizError::EmptyInput);
    }

    let mut groups: Vec<String> = Vec::new();
    let mut rows: Vec<MetricRow> = Vec::new();
    for (key, value) in flat {
        let Some((group, metric)) = key.split_once('_') else {
            continue;
        };
        if group.is_empty() || metric.is_empty() {
            continue;
        }
        let col = match groups.iter().position(|g| g == group) {
            Some(col) => col,
            None => {
                groups.push(group.to_string());
                for row in &mut rows {
                    row.values.push(None);
                }
                groups.len() - 1
            }
        };
        let row = match rows.iter().position(|r| r.metric == metric) {
            Some(row) => row,
            None => {
                rows.push(MetricRow {
                    metric: metric.to_string(),
                    values: vec![None; groups.len()],
                });
                rows.len() - 1
            }
        };
        rows[row].values[col] = Some(*value);
    }

    if rows.is_empty() {
        return Err(VizError::EmptyInput);
    }
    Ok(MetricPivot { groups, rows })
}
