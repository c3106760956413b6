//! Job-run triggering.
//!
//! Jobs receive their parameters as environment variables. The map arrives
//! as ordered pairs, entries with an empty key are dropped, and the
//! survivors are serialized as "KEY=VALUE" strings in the run configuration.

use serde_json::{json, Value};

use crate::error::{PlatformError, PlatformResult};
use crate::logging::{self, Domain, Level};
use crate::platform::{AuthToken, PlatformClient};

/// "KEY=VALUE" serialization with empty keys dropped, order preserved.
pub fn render_env_vars(env: &[(String, String)]) -> Vec<String> {
    env.iter()
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| format!("{}={}", key, value))
        .collect()
}

/// Retraining jobs need to know which model to rebuild; the inspection flow
/// injects the asset id under MODEL_ID, overriding any user-typed entry.
pub fn with_model_id(mut env: Vec<(String, String)>, model_id: &str) -> Vec<(String, String)> {
    if let Some(entry) = env.iter_mut().find(|(key, _)| key == "MODEL_ID") {
        entry.1 = model_id.to_string();
    } else {
        env.push(("MODEL_ID".to_string(), model_id.to_string()));
    }
    env
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobRun {
    /// Run asset id when the platform reports one.
    pub run_id: Option<String>,
    /// Full creation response for display.
    pub raw: Value,
}

impl PlatformClient {
    pub async fn trigger_job(
        &self,
        token: &AuthToken,
        project_id: &str,
        job_id: &str,
        env: &[(String, String)],
    ) -> PlatformResult<JobRun> {
        let url = format!("{}/v2/jobs/{}/runs", self.config().cpd_base, job_id);
        let config = json!({
            "job_run": {
                "configuration": {
                    "env_variables": render_env_vars(env)
                }
            }
        });
        let req = self
            .authed(
                self.http().post(&url).query(&[("project_id", project_id)]),
                token,
            )
            .json(&config);
        let body = self
            .send_for_text(Domain::Jobs, "POST", "/v2/jobs/{id}/runs", req)
            .await
            .map_err(PlatformError::job_trigger)?;
        let raw: Value =
            serde_json::from_str(&body).map_err(|e| PlatformError::job_trigger(e.to_string()))?;

        let run_id = raw
            .pointer("/metadata/asset_id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        logging::log(
            Level::Info,
            Domain::Jobs,
            "job_run_created",
            logging::obj(&[
                ("job_id", logging::v_str(job_id)),
                (
                    "run_id",
                    run_id.as_deref().map(logging::v_str).unwrap_or(Value::Null),
                ),
            ]),
        );
        Ok(JobRun { run_id, raw })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_keys_are_dropped_before_submission() {
        let env = vec![
            ("ALPHA".to_string(), "1".to_string()),
            ("".to_string(), "ignored".to_string()),
            ("BETA".to_string(), "two".to_string()),
        ];
        assert_eq!(render_env_vars(&env), vec!["ALPHA=1", "BETA=two"]);
    }

    #[test]
    fn order_is_preserved_and_values_may_be_empty() {
        let env = vec![
            ("Z".to_string(), String::new()),
            ("A".to_string(), "x".to_string()),
        ];
        assert_eq!(render_env_vars(&env), vec!["Z=", "A=x"]);
    }

    #[test]
    fn model_id_is_appended_or_overwritten() {
        let env = vec![("EPOCHS".to_string(), "10".to_string())];
        let env = with_model_id(env, "asset-7");
        assert_eq!(env.last().unwrap(), &("MODEL_ID".to_string(), "asset-7".to_string()));

        let env = with_model_id(env, "asset-8");
        assert_eq!(env.len(), 2);
        assert_eq!(env[1].1, "asset-8");
    }
}
