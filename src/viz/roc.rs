//! ROC curve payloads from precomputed rate vectors.
//!
//! The rates arrive already computed (they ship inside stored model
//! evaluation output), so these builders only validate and package them.

use crate::error::VizError;

/// Point-paired ROC trace plus the render hints the curve always carries:
/// shaded area under the trace, a chance diagonal, and square axes.
#[derive(Debug, Clone, PartialEq)]
pub struct RocCurve {
    /// `(false positive rate, true positive rate)` pairs, input order kept.
    pub points: Vec<(f64, f64)>,
    pub fill: bool,
    pub square_aspect: bool,
}

impl RocCurve {
    /// Chance reference line from the origin to `(1, 1)`.
    pub fn diagonal() -> [(f64, f64); 2] {
        [(0.0, 0.0), (1.0, 1.0)]
    }
}

pub fn roc_curve(fpr: &[f64], tpr: &[f64]) -> Result<RocCurve, VizError> {
    if fpr.len() != tpr.len() {
        return Err(VizError::LengthMismatch {
            expected: fpr.len(),
            got: tpr.len(),
        });
    }
    if fpr.is_empty() {
        return Err(VizError::EmptyInput);
    }
    Ok(RocCurve {
        points: fpr.iter().copied().zip(tpr.iter().copied()).collect(),
        fill: true,
        square_aspect: true,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdCurves {
    pub points: Vec<ThresholdPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPoint {
    pub threshold: f64,
    pub fpr: f64,
    pub tpr: f64,
}

/// Rate pair per decision threshold. Classifier outputs sometimes report a
/// sentinel threshold above 1 for the empty-prediction end of the sweep, so
/// thresholds are clamped into `[0, 1]` before plotting.
pub fn roc_by_threshold(
    fpr: &[f64],
    tpr: &[f64],
    thresholds: &[f64],
) -> Result<ThresholdCurves, VizError> {
    for got in [tpr.len(), thresholds.len()] {
        if got != fpr.len() {
            return Err(VizError::LengthMismatch {
                expected: fpr.len(),
                got,
            });
        }
    }
    if fpr.is_empty() {
        return Err(VizError::EmptyInput);
    }
    let points = thresholds
        .iter()
        .zip(fpr.iter().zip(tpr))
        .map(|(t, (f, p))| ThresholdPoint {
            threshold: t.clamp(0.0, 1.0),
            fpr: *f,
            tpr: *p,
        })
        .collect();
    Ok(ThresholdCurves { points })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_keeps_pairs_and_render_hints() {
        let curve = roc_curve(&[0.0, 0.2, 1.0], &[0.0, 0.8, 1.0]).unwrap();
        assert_eq!(curve.points, vec![(0.0, 0.0), (0.2, 0.8), (1.0, 1.0)]);
        assert!(curve.fill);
        assert!(curve.square_aspect);
        assert_eq!(RocCurve::diagonal(), [(0.0, 0.0), (1.0, 1.0)]);
    }

    #[test]
    fn mismatched_rates_are_rejected() {
        assert_eq!(
            roc_curve(&[0.0, 0.5], &[0.0]).unwrap_err(),
            VizError::LengthMismatch {
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn empty_rates_are_rejected() {
        assert_eq!(roc_curve(&[], &[]).unwrap_err(), VizError::EmptyInput);
        assert_eq!(
            roc_by_threshold(&[], &[], &[]).unwrap_err(),
            VizError::EmptyInput
        );
    }

    #[test]
    fn sentinel_thresholds_are_clamped() {
        let out = roc_by_threshold(&[0.0, 0.3], &[0.0, 0.9], &[1.8, 0.5]).unwrap();
        assert_eq!(out.points[0].threshold, 1.0);
        assert_eq!(out.points[1].threshold, 0.5);
        assert_eq!(out.points[1].fpr, 0.3);
        assert_eq!(out.points[1].tpr, 0.9);
    }

    #[test]
    fn threshold_vector_must_match() {
        assert_eq!(
            roc_by_threshold(&[0.0, 0.3], &[0.0, 0.9], &[0.5]).unwrap_err(),
            VizError::LengthMismatch {
                expected: 2,
                got: 1
            }
        );
    }
}
