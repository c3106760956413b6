//! Synchronous scoring.
//!
//! Requests are single-row: ordered field names plus one row of values. The
//! response parser implements the binary-classification contract, the only
//! layout this system claims to support: the first predicted row's last two
//! slots are (class label, probability), with a per-class vector in the last
//! slot collapsing to its maximum. Any deviation is a `ResponseShape` error,
//! not a guess. Multiclass and regression deployments are out of contract.

use async_trait::async_trait;
use serde_json::{json, Value};
use url::Url;

use crate::error::{PlatformError, PlatformResult};
use crate::logging::Domain;
use crate::platform::{AuthToken, DeploymentDetails, PlatformClient};

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Rounded to the configured precision, always within [0, 1].
    pub probability: f64,
    /// Class label exactly as the platform reported it (number or string).
    pub label: Value,
}

/// Keep only the fields the model's input schema declares, in payload order.
/// No schema means no filtering.
pub fn filter_by_schema(
    payload: &[(String, Value)],
    schema: Option<&[String]>,
) -> Vec<(String, Value)> {
    match schema {
        Some(fields) => payload
            .iter()
            .filter(|(name, _)| fields.iter().any(|f| f == name))
            .cloned()
            .collect(),
        None => payload.to_vec(),
    }
}

/// Wire shape: `{"input_data":[{"fields":[...],"values":[[...]]}]}`.
pub fn build_request(payload: &[(String, Value)]) -> Value {
    let fields: Vec<&str> = payload.iter().map(|(name, _)| name.as_str()).collect();
    let row: Vec<Value> = payload.iter().map(|(_, value)| value.clone()).collect();
    json!({
        "input_data": [{
            "fields": fields,
            "values": [row]
        }]
    })
}

/// Half-away-from-zero rounding to `precision` decimal digits.
pub fn round_probability(p: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (p * factor).round() / factor
}

fn parse_prediction(body: &str, precision: u32) -> PlatformResult<Prediction> {
    let parsed: Value =
        serde_json::from_str(body).map_err(|e| PlatformError::shape(e.to_string()))?;
    let row = parsed
        .get("predictions")
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("values"))
        .and_then(|v| v.get(0))
        .and_then(|r| r.as_array())
        .ok_or_else(|| PlatformError::shape("response has no predictions[0].values[0] row"))?;

    if row.len() < 2 {
        return Err(PlatformError::shape(format!(
            "prediction row has {} slots, need at least 2 (class, probability)",
            row.len()
        )));
    }

    let label = row[row.len() - 2].clone();
    let probability = match &row[row.len() - 1] {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| PlatformError::shape("probability is not representable as a float"))?,
        Value::Array(items) => {
            if items.is_empty() {
                return Err(PlatformError::shape("probability vector is empty"));
            }
            let mut max = f64::NEG_INFINITY;
            for item in items {
                let v = item.as_f64().ok_or_else(|| {
                    PlatformError::shape("probability vector holds a non-numeric entry")
                })?;
                max = max.max(v);
            }
            max
        }
        other => {
            return Err(PlatformError::shape(format!(
                "probability slot is neither a number nor a vector: {}",
                other
            )))
        }
    };

    if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
        return Err(PlatformError::shape(format!(
            "probability {} outside [0, 1]",
            probability
        )));
    }

    Ok(Prediction {
        probability: round_probability(probability, precision),
        label,
    })
}

/// Seam between the prediction form and the wire. The client scores against
/// the live serving URL; tests and demos drop in a stub.
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(
        &self,
        token: &AuthToken,
        deployment: &DeploymentDetails,
        payload: &[(String, Value)],
    ) -> PlatformResult<Prediction>;
}

#[async_trait]
impl Scorer for PlatformClient {
    async fn score(
        &self,
        token: &AuthToken,
        deployment: &DeploymentDetails,
        payload: &[(String, Value)],
    ) -> PlatformResult<Prediction> {
        let serving_url = deployment
            .serving_url
            .as_deref()
            .ok_or_else(|| PlatformError::prediction("deployment exposes no serving url"))?;

        let log_path = Url::parse(serving_url)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| "serving-url".to_string());

        let req = self
            .authed(self.http().post(serving_url), token)
            .query(&[("version", self.config().api_version.as_str())])
            .json(&build_request(payload));
        let body = self
            .send_for_text(Domain::Scoring, "POST", &log_path, req)
            .await
            .map_err(PlatformError::prediction)?;

        parse_prediction(&body, self.config().precision)
    }
}

// Stub scorer to make form integration explicit in tests and demos.
pub struct FixedScorer {
    outcome: PlatformResult<Prediction>,
}

impl FixedScorer {
    pub fn ok(probability: f64, label: Value) -> Self {
        Self { outcome: Ok(Prediction { probability, label }) }
    }

    pub fn fail(err: PlatformError) -> Self {
        Self { outcome: Err(err) }
    }
}

#[async_trait]
impl Scorer for FixedScorer {
    async fn score(
        &self,
        _token: &AuthToken,
        _deployment: &DeploymentDetails,
        _payload: &[(String, Value)],
    ) -> PlatformResult<Prediction> {
        self.outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalar_probability_and_class() {
        let body = r#"{"predictions":[{"values":[[1, 0, 0.73]]}]}"#;
        let p = parse_prediction(body, 2).unwrap();
        assert_eq!(p.probability, 0.73);
        assert_eq!(p.label, json!(0));
    }

    #[test]
    fn probability_vector_collapses_to_its_maximum() {
        let body = r#"{"predictions":[{"values":[[0, [0.2, 0.8]]]}]}"#;
        let p = parse_prediction(body, 2).unwrap();
        assert_eq!(p.probability, 0.8);
        assert_eq!(p.label, json!(0));
    }

    #[test]
    fn rounding_applies_the_configured_precision() {
        assert_eq!(round_probability(0.736, 2), 0.74);
        assert_eq!(round_probability(0.7349, 2), 0.73);
        assert_eq!(round_probability(0.5, 0), 1.0);

        let body = r#"{"predictions":[{"values":[[1, 0.98765]]}]}"#;
        let p = parse_prediction(body, 3).unwrap();
        assert_eq!(p.probability, 0.988);
    }

    #[test]
    fn short_row_is_a_shape_mismatch() {
        let body = r#"{"predictions":[{"values":[[0.9]]}]}"#;
        let err = parse_prediction(body, 2).unwrap_err();
        assert!(matches!(err, PlatformError::ResponseShape { .. }));
        assert!(err.detail().contains("1 slots"));
    }

    #[test]
    fn missing_predictions_is_a_shape_mismatch() {
        for body in [r#"{"predictions":[]}"#, r#"{"result":"ok"}"#, "not json"] {
            let err = parse_prediction(body, 2).unwrap_err();
            assert!(matches!(err, PlatformError::ResponseShape { .. }), "body: {}", body);
        }
    }

    #[test]
    fn out_of_range_probability_is_a_shape_mismatch() {
        let body = r#"{"predictions":[{"values":[[1, 1.7]]}]}"#;
        let err = parse_prediction(body, 2).unwrap_err();
        assert!(err.detail().contains("outside"));

        let body = r#"{"predictions":[{"values":[[1, "high"]]}]}"#;
        assert!(parse_prediction(body, 2).is_err());
    }

    #[test]
    fn schema_filtering_keeps_payload_order() {
        let payload = vec![
            ("age".to_string(), json!(30)),
            ("income".to_string(), json!(50000)),
            ("zip".to_string(), json!("10001")),
        ];
        let schema = vec!["income".to_string(), "age".to_string()];
        let filtered = filter_by_schema(&payload, Some(&schema));
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].0, "age");
        assert_eq!(filtered[1].0, "income");

        let unfiltered = filter_by_schema(&payload, None);
        assert_eq!(unfiltered.len(), 3);
    }

    #[test]
    fn request_wraps_one_row_of_values() {
        let payload = vec![
            ("age".to_string(), json!(30)),
            ("city".to_string(), json!("London")),
        ];
        let req = build_request(&payload);
        assert_eq!(
            req,
            json!({"input_data": [{"fields": ["age", "city"], "values": [[30, "London"]]}]})
        );
    }
}
