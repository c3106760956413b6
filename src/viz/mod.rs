//! Chart-data builders.
//!
//! Pure transforms from a table (or a precomputed payload) into structures
//! the presentation layer can hand straight to a plotting library. Nothing
//! here draws; nothing here touches the network. Every builder short-
//! circuits on empty input with `VizError::EmptyInput` instead of computing
//! on nothing.

use crate::error::VizError;
use crate::table::{Cell, Table};

pub mod histogram;
pub mod metrics;
pub mod quantile;
pub mod roc;
pub mod shap;

pub use histogram::{distribution_by_class, BoxStats, ClassDistribution, ClassGroup};
pub use metrics::{pivot_metrics, MetricPivot, MetricRow};
pub use quantile::{rate_per_quantile_bin, BinRate, BinRates};
pub use roc::{roc_by_threshold, roc_curve, RocCurve, ThresholdCurves, ThresholdPoint};
pub use shap::{beeswarm, ShapFeature, ShapPoint, ShapSummary};

pub(crate) fn require_rows(table: &Table) -> Result<(), VizError> {
    if table.is_empty() {
        Err(VizError::EmptyInput)
    } else {
        Ok(())
    }
}

pub(crate) fn numeric_column<'a>(
    table: &'a Table,
    name: &str,
) -> Result<&'a [Option<f64>], VizError> {
    let column = table
        .column(name)
        .ok_or_else(|| VizError::unknown_column(name))?;
    column
        .numeric_values()
        .ok_or_else(|| VizError::column_type(name, "numeric"))
}

/// Label cells rendered to grouping keys; nulls stay `None` and are dropped
/// by the builders.
pub(crate) fn label_keys(table: &Table, name: &str) -> Result<Vec<Option<String>>, VizError> {
    let column = table
        .column(name)
        .ok_or_else(|| VizError::unknown_column(name))?;
    Ok((0..column.len())
        .map(|idx| match column.cell(idx) {
            Cell::Null => None,
            cell => Some(cell.render()),
        })
        .collect())
}

/// Quantile by linear interpolation between order statistics, `p` in [0, 1],
/// over an ascending-sorted non-empty slice.
pub(crate) fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = p * (n - 1) as f64;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
    }
}
