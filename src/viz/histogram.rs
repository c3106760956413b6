//! Feature distribution split by class label.
//!
//! One group per distinct label value, each carrying the raw feature values
//! (for overlaid histograms) plus five-number box stats. Rows where either
//! the feature or the label is null are dropped before grouping.

use crate::error::VizError;
use crate::table::Table;

use super::{label_keys, numeric_column, quantile_sorted, require_rows};

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDistribution {
    pub feature: String,
    pub label: String,
    pub groups: Vec<ClassGroup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassGroup {
    pub label: String,
    pub values: Vec<f64>,
    pub stats: BoxStats,
}

/// Five-number summary with quartiles by linear interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxStats {
    fn from_unsorted(values: &[f64]) -> BoxStats {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        BoxStats {
            min: sorted[0],
            q1: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            q3: quantile_sorted(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        }
    }
}

/// Groups a numeric feature by label value, in first-seen label order.
pub fn distribution_by_class(
    table: &Table,
    feature: &str,
    label: &str,
) -> Result<ClassDistribution, VizError> {
    require_rows(table)?;
    let values = numeric_column(table, feature)?;
    let labels = label_keys(table, label)?;

    let mut grouped: Vec<(String, Vec<f64>)> = Vec::new();
    for (value, key) in values.iter().zip(labels) {
        let (Some(value), Some(key)) = (value, key) else {
            continue;
        };
        match grouped.iter_mut().find(|(name, _)| *name == key) {
            Some((_, bucket)) => bucket.push(*value),
            None => grouped.push((key, vec![*value])),
        }
    }
    if grouped.is_empty() {
        return Err(VizError::EmptyInput);
    }

    let groups = grouped
        .into_iter()
        .map(|(label, values)| {
            let stats = BoxStats::from_unsorted(&values);
            ClassGroup {
                label,
                values,
                stats,
            }
        })
        .collect();
    Ok(ClassDistribution {
        feature: feature.to_string(),
        label: label.to_string(),
        groups,
    })
}
