//! Local end-to-end pass: CSV into a typed table, the table into session
//! state and chart builders, and the prediction form driven by a stub
//! scorer. No network involved.

use std::fs;

use serde_json::json;
use tempfile::TempDir;

use cpdash::error::{SessionError, VizError};
use cpdash::form::{FormState, PredictionForm};
use cpdash::platform::{AssetKind, AuthToken, DeploymentDetails, FixedScorer, Resource};
use cpdash::session::Session;
use cpdash::table::Table;
use cpdash::viz;

/// Twenty rows, distinct ages, alternating risk label, cycling city.
fn churn_csv() -> String {
    let mut out = String::from("age,income,city,risk\n");
    for i in 1..=20 {
        let city = ["paris", "lyon", "nice"][i % 3];
        out.push_str(&format!("{},{},{},{}\n", 20 + i, 1000 * i, city, i % 2));
    }
    out
}

fn churn_table() -> Table {
    Table::from_csv_str(&churn_csv()).unwrap()
}

fn deployment() -> DeploymentDetails {
    DeploymentDetails {
        id: "dep-1".to_string(),
        name: Some("churn-predictor".to_string()),
        asset_id: "asset-7".to_string(),
        asset_kind: AssetKind::Model,
        serving_url: None,
    }
}

// ---------------------------------------------------------------------------
// Table loading
// ---------------------------------------------------------------------------

#[test]
fn csv_types_columns_and_fingerprints_stably() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("churn.csv");
    fs::write(&path, churn_csv()).unwrap();

    let from_file = Table::from_csv_path(&path).unwrap();
    let from_str = churn_table();

    assert_eq!(from_file.n_rows(), 20);
    assert_eq!(from_file.column_names(), vec!["age", "income", "city", "risk"]);
    assert!(from_file.column("age").unwrap().is_numeric());
    assert!(!from_file.column("city").unwrap().is_numeric());
    assert_eq!(from_file.fingerprint(), from_str.fingerprint());
}

// ---------------------------------------------------------------------------
// Session guards
// ---------------------------------------------------------------------------

#[test]
fn pages_are_blocked_until_their_inputs_exist() {
    let mut session = Session::new();
    assert_eq!(
        session.require_token().unwrap_err(),
        SessionError::NotAuthenticated
    );
    assert_eq!(session.require_table().unwrap_err(), SessionError::NoTable);

    session.set_token(AuthToken::new("tok"));
    session.select_project(Resource::new("churn-analysis", "p-111"));
    session.select_dataset(Resource::new("churn.csv", "ds-1"));
    session.install_table("ds-1", churn_table());

    assert!(session.require_token().is_ok());
    assert!(session.require_project().is_ok());
    let table = session.require_table().unwrap();
    assert_eq!(table.n_rows(), 20);
}

// ---------------------------------------------------------------------------
// Chart builders on a real table
// ---------------------------------------------------------------------------

#[test]
fn distribution_and_quantile_views_agree_with_the_data() {
    let table = churn_table();

    let dist = viz::distribution_by_class(&table, "age", "risk").unwrap();
    assert_eq!(dist.groups.len(), 2);
    let total: usize = dist.groups.iter().map(|g| g.values.len()).sum();
    assert_eq!(total, 20);

    let binned = viz::rate_per_quantile_bin(&table, "age", "risk", 0.25).unwrap();
    assert_eq!(binned.bins.len(), 4);
    for bin in &binned.bins {
        assert_eq!(bin.count, 5);
        let sum: f64 = bin.rates.iter().map(|(_, r)| r).sum();
        assert!((sum - 1.0).abs() < 1e-9, "rates must sum to 1, got {}", sum);
    }
}

#[test]
fn bin_rates_sum_to_one_for_any_step() {
    let table = churn_table();
    for q in [0.1, 0.2, 0.25, 0.5] {
        let binned = viz::rate_per_quantile_bin(&table, "age", "risk", q).unwrap();
        for bin in &binned.bins {
            if bin.count == 0 {
                continue;
            }
            let sum: f64 = bin.rates.iter().map(|(_, r)| r).sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
    }
}

#[test]
fn metric_pivot_splits_groups_from_metric_names() {
    let flat = vec![
        ("training_accuracy".to_string(), 0.9),
        ("holdout_accuracy".to_string(), 0.8),
        ("training_f1_measure".to_string(), 0.7),
        ("iterations".to_string(), 40.0),
    ];
    let pivot = viz::pivot_metrics(&flat).unwrap();
    assert_eq!(pivot.groups, vec!["training", "holdout"]);
    assert_eq!(pivot.value("accuracy", "training"), Some(0.9));
    assert_eq!(pivot.value("accuracy", "holdout"), Some(0.8));
    assert_eq!(pivot.value("f1_measure", "holdout"), None);
}

#[test]
fn zero_row_input_blocks_every_chart() {
    let empty = Table::from_csv_str("age,risk\n").unwrap();
    assert_eq!(
        viz::distribution_by_class(&empty, "age", "risk").unwrap_err(),
        VizError::EmptyInput
    );
    assert_eq!(
        viz::rate_per_quantile_bin(&empty, "age", "risk", 0.25).unwrap_err(),
        VizError::EmptyInput
    );
    assert_eq!(viz::roc_curve(&[], &[]).unwrap_err(), VizError::EmptyInput);
    assert_eq!(viz::pivot_metrics(&[]).unwrap_err(), VizError::EmptyInput);
}

// ---------------------------------------------------------------------------
// Prediction form with a stub scorer
// ---------------------------------------------------------------------------

#[tokio::test]
async fn form_cycle_updates_previous_only_on_success() {
    let table = churn_table();
    let token = AuthToken::new("tok");
    let deployment = deployment();
    let mut form = PredictionForm::new(None);

    form.select_row(&table, 0).unwrap();
    form.edit_field("age", "55").unwrap();

    let first = FixedScorer::ok(0.73, json!(0));
    form.submit(&first, &token, &deployment).await.unwrap();
    assert_eq!(form.state(), FormState::Predicted);
    assert_eq!(form.current_probability(), Some(0.73));
    assert_eq!(form.previous_probability(), None);

    form.edit_field("age", "25").unwrap();
    let second = FixedScorer::ok(0.41, json!(0));
    form.submit(&second, &token, &deployment).await.unwrap();
    assert_eq!(form.current_probability(), Some(0.41));
    assert_eq!(form.previous_probability(), Some(0.73));
    assert!((form.delta().unwrap() + 0.32).abs() < 1e-9);

    let failing = FixedScorer::fail(cpdash::error::PlatformError::prediction(
        "scoring backend oom",
    ));
    let err = form.submit(&failing, &token, &deployment).await.unwrap_err();
    assert!(matches!(err, cpdash::error::SubmitError::Scoring(_)));
    assert_eq!(form.state(), FormState::RowSelected);
    assert_eq!(form.current_probability(), Some(0.41));
    assert_eq!(form.previous_probability(), Some(0.73));
    assert_eq!(form.last_error(), Some("scoring backend oom"));

    // browsing another row keeps the comparison pair
    form.select_row(&table, 7).unwrap();
    assert_eq!(form.current_probability(), Some(0.41));
    assert_eq!(form.previous_probability(), Some(0.73));
}

#[tokio::test]
async fn submitted_payload_respects_the_model_schema() {
    let table = churn_table();
    let mut form = PredictionForm::new(Some(vec!["age".to_string(), "income".to_string()]));
    form.select_row(&table, 2).unwrap();

    let payload = form.begin_submit().unwrap();
    let names: Vec<&str> = payload.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["age", "income"]);
    assert_eq!(payload[0].1, json!(23.0));
    assert_eq!(payload[1].1, json!(3000.0));
}
