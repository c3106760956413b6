//! Beeswarm payload from stored SHAP output.
//!
//! Models trained with explainability enabled store per-sample attributions
//! next to the feature values they were computed from. The builder checks
//! the two matrices agree on shape, normalizes feature values into a color
//! scale, and orders features by mean absolute attribution so the most
//! influential rows plot first.

use crate::error::VizError;
use crate::platform::ShapPayload;

#[derive(Debug, Clone, PartialEq)]
pub struct ShapSummary {
    /// Model expected value, the anchor attributions are measured against.
    pub base_value: f64,
    /// Features in descending mean-absolute-attribution order.
    pub features: Vec<ShapFeature>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapFeature {
    pub name: String,
    pub mean_abs: f64,
    pub points: Vec<ShapPoint>,
}

/// One sample on one feature row. `color` is the feature value rescaled to
/// `[0, 1]` within its feature, 0.5 when the feature never varies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapPoint {
    pub sample: usize,
    pub attribution: f64,
    pub color: f64,
}

pub fn beeswarm(payload: &ShapPayload) -> Result<ShapSummary, VizError> {
    let n = payload.values.len();
    let width = payload.feature_names.len();
    if n == 0 || width == 0 {
        return Err(VizError::EmptyInput);
    }
    if payload.data.len() != n {
        return Err(VizError::LengthMismatch {
            expected: n,
            got: payload.data.len(),
        });
    }
    for row in payload.values.iter().chain(&payload.data) {
        if row.len() != width {
            return Err(VizError::LengthMismatch {
                expected: width,
                got: row.len(),
            });
        }
    }

    let mut features: Vec<ShapFeature> = Vec::with_capacity(width);
    for (j, name) in payload.feature_names.iter().enumerate() {
        let raw: Vec<f64> = payload.data.iter().map(|row| row[j]).collect();
        let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
        let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = max - min;

        let points: Vec<ShapPoint> = payload
            .values
            .iter()
            .enumerate()
            .map(|(sample, row)| ShapPoint {
                sample,
                attribution: row[j],
                color: if span == 0.0 {
                    0.5
                } else {
                    (raw[sample] - min) / span
                },
            })
            .collect();
        let mean_abs =
            points.iter().map(|p| p.attribution.abs()).sum::<f64>() / points.len() as f64;
        features.push(ShapFeature {
            name: name.clone(),
            mean_abs,
            points,
        });
    }
    features.sort_by(|a, b| b.mean_abs.total_cmp(&a.mean_abs));

    Ok(ShapSummary {
        base_value: payload.expected_value,
        features,
    })
}
