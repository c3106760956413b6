//! Label rate per quantile bin of a numeric feature.
//!
//! Bin edges are quantiles of the observed feature values, so each bin holds
//! roughly the same number of rows. Heavily repeated values produce repeated
//! edges; the collapse policy is explicit:
//!
//! * duplicate edges are merged, so the result may hold fewer bins than
//!   `1 / q` asked for, each still labelled by its true `(lo, hi]` range;
//! * when fewer than two distinct edges survive (a near-constant feature),
//!   the builder refuses with `VizError::InsufficientCardinality` rather
//!   than fabricating a single degenerate bar.

use crate::error::VizError;
use crate::table::Table;

use super::{label_keys, numeric_column, quantile_sorted, require_rows};

#[derive(Debug, Clone, PartialEq)]
pub struct BinRates {
    pub feature: String,
    pub label: String,
    /// Distinct ascending quantile edges, `bins.len() + 1` of them.
    pub edges: Vec<f64>,
    pub bins: Vec<BinRate>,
}

/// One quantile bin. The first bin is closed on both ends; every later bin
/// is `(lo, hi]`. `rates` lists every label value seen in the dataset, in
/// first-seen order, normalized to sum 1.0 over `count`. Empty bins keep
/// `count == 0` and an empty `rates` list.
#[derive(Debug, Clone, PartialEq)]
pub struct BinRate {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
    pub rates: Vec<(String, f64)>,
}

/// Splits a numeric feature at quantile steps of `q` (clamped to
/// `[0.01, 0.5]`) and reports the label mix inside each bin. Rows with a
/// null feature or label are dropped first.
pub fn rate_per_quantile_bin(
    table: &Table,
    feature: &str,
    label: &str,
    q: f64,
) -> Result<BinRates, VizError> {
    require_rows(table)?;
    let q = q.clamp(0.01, 0.5);
    let values = numeric_column(table, feature)?;
    let labels = label_keys(table, label)?;

    let mut pairs: Vec<(f64, String)> = Vec::new();
    for (value, key) in values.iter().zip(labels) {
        if let (Some(value), Some(key)) = (value, key) {
            pairs.push((*value, key));
        }
    }
    if pairs.is_empty() {
        return Err(VizError::EmptyInput);
    }

    let mut sorted: Vec<f64> = pairs.iter().map(|(v, _)| *v).collect();
    sorted.sort_by(f64::total_cmp);

    let requested = (1.0 / q).ceil() as usize;
    let mut edges: Vec<f64> = (0..=requested)
        .map(|i| quantile_sorted(&sorted, (i as f64 * q).min(1.0)))
        .collect();
    edges.dedup();
    if edges.len() < 2 {
        return Err(VizError::InsufficientCardinality {
            requested,
            distinct: edges.len(),
        });
    }

    let mut label_order: Vec<String> = Vec::new();
    for (_, key) in &pairs {
        if !label_order.contains(key) {
            label_order.push(key.clone());
        }
    }

    // counts[bin][label position]
    let n_bins = edges.len() - 1;
    let mut counts = vec![vec![0usize; label_order.len()]; n_bins];
    for (value, key) in &pairs {
        let bin = bin_index(&edges, *value);
        let pos = label_order
            .iter()
            .position(|l| l == key)
            .unwrap_or_default();
        counts[bin][pos] += 1;
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, per_label)| {
            let count: usize = per_label.iter().sum();
            let rates = if count == 0 {
                Vec::new()
            } else {
                label_order
                    .iter()
                    .zip(&per_label)
                    .map(|(label, n)| (label.clone(), *n as f64 / count as f64))
                    .collect()
            };
            BinRate {
                lo: edges[i],
                hi: edges[i + 1],
                count,
                rates,
            }
        })
        .collect();

    Ok(BinRates {
        feature: feature.to_string(),
        label: label.to_string(),
        edges,
        bins,
    })
}

/// First bin whose upper edge covers the value. Values equal to the global
/// minimum land in bin 0, everything else follows `(lo, hi]`.
fn bin_index(edges: &[f64], value: f64) -> usize {
    let last = edges.len() - 2;
    for i in 0..=last {
        if value <= edges[i + 1] {
            return i;
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spread_fixture() -> Table {
        Table::from_csv_str(
            "score,churn\n\
             1,yes\n2,no\n3,yes\n4,no\n5,yes\n6,no\n7,yes\n8,yes\n",
        )
        .unwrap()
    }

    #[test]
    fn quartiles_split_evenly_and_rates_sum_to_one() {
        let out = rate_per_quantile_bin(&spread_fixture(), "score", "churn", 0.25).unwrap();
        assert_eq!(out.bins.len(), 4);
        assert_eq!(out.edges.len(), 5);
        for bin in &out.bins {
            assert_eq!(bin.count, 2);
            let total: f64 = bin.rates.iter().map(|(_, r)| r).sum();
            assert!((total - 1.0).abs() < 1e-9);
            // every label appears in every populated bin, first-seen order
            assert_eq!(bin.rates[0].0, "yes");
            assert_eq!(bin.rates[1].0, "no");
        }
        assert_eq!(out.bins[3].rates, vec![("yes".into(), 1.0), ("no".into(), 0.0)]);
    }

    #[test]
    fn minimum_value_lands_in_the_first_bin() {
        let out = rate_per_quantile_bin(&spread_fixture(), "score", "churn", 0.25).unwrap();
        assert_eq!(out.bins[0].lo, 1.0);
        assert_eq!(bin_index(&out.edges, 1.0), 0);
        assert_eq!(bin_index(&out.edges, out.edges[1]), 0);
    }

    #[test]
    fn duplicate_edges_collapse_into_fewer_bins() {
        let t = Table::from_csv_str("score,churn\n1,yes\n1,no\n1,yes\n1,no\n2,yes\n").unwrap();
        let out = rate_per_quantile_bin(&t, "score", "churn", 0.25).unwrap();
        assert_eq!(out.edges, vec![1.0, 2.0]);
        assert_eq!(out.bins.len(), 1);
        assert_eq!(out.bins[0].count, 5);
    }

    #[test]
    fn constant_feature_is_refused() {
        let t = Table::from_csv_str("score,churn\n3,yes\n3,no\n3,yes\n").unwrap();
        assert_eq!(
            rate_per_quantile_bin(&t, "score", "churn", 0.25).unwrap_err(),
            VizError::InsufficientCardinality {
                requested: 4,
                distinct: 1
            }
        );
    }

    #[test]
    fn quantile_step_is_clamped() {
        let out = rate_per_quantile_bin(&spread_fixture(), "score", "churn", 2.0).unwrap();
        assert_eq!(out.bins.len(), 2);
    }

    #[test]
    fn empty_table_is_rejected() {
        let t = Table::from_csv_str("score,churn\n").unwrap();
        assert_eq!(
            rate_per_quantile_bin(&t, "score", "churn", 0.25).unwrap_err(),
            VizError::EmptyInput
        );
    }

    #[test]
    fn null_rows_are_dropped_before_binning() {
        let t = Table::from_csv_str("score,churn\n1,yes\n,no\n2,\n3,no\n4,yes\n").unwrap();
        let out = rate_per_quantile_bin(&t, "score", "churn", 0.5).unwrap();
        let total: usize = out.bins.iter().map(|b| b.count).sum();
        assert_eq!(total, 3);
    }
}
