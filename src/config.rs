//! Runtime configuration, environment-driven with coded defaults.
//!
//! Construction never fails: unparsable values fall back to their defaults so
//! a misconfigured shell cannot keep the dashboard from starting. Everything
//! here is read-only after construction; the config is the only state shared
//! across sessions.

pub const DEFAULT_CPD_BASE: &str = "https://api.dataplatform.cloud.ibm.com";
pub const DEFAULT_ML_BASE: &str = "https://us-south.ml.cloud.ibm.com";
pub const DEFAULT_IAM_BASE: &str = "https://iam.ng.bluemix.net";
pub const DEFAULT_API_VERSION: &str = "2021-01-01";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for data-plane endpoints (projects, search, assets, jobs).
    pub cpd_base: String,
    /// Base URL for ML serving endpoints (deployments, models, functions).
    pub ml_base: String,
    /// Base URL for the token exchange.
    pub iam_base: String,
    /// Version query parameter required by the ML endpoints.
    pub api_version: String,
    /// Server-side page size for the project listing.
    pub list_limit: u32,
    /// Decimal digits kept when rounding predicted probabilities.
    pub precision: u32,
    /// Row count for table preview samples.
    pub preview_rows: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            cpd_base: std::env::var("CPD_BASE").unwrap_or_else(|_| DEFAULT_CPD_BASE.to_string()),
            ml_base: std::env::var("ML_BASE").unwrap_or_else(|_| DEFAULT_ML_BASE.to_string()),
            iam_base: std::env::var("IAM_BASE").unwrap_or_else(|_| DEFAULT_IAM_BASE.to_string()),
            api_version: std::env::var("API_VERSION").unwrap_or_else(|_| DEFAULT_API_VERSION.to_string()),
            list_limit: std::env::var("LIST_LIMIT").ok().and_then(|v| v.parse().ok()).unwrap_or(100),
            precision: std::env::var("PRECISION").ok().and_then(|v| v.parse().ok()).unwrap_or(2),
            preview_rows: std::env::var("PREVIEW_ROWS").ok().and_then(|v| v.parse().ok()).unwrap_or(20),
        }
    }

    /// Point every base URL at one host. Used by tests against a local mock.
    pub fn with_bases(base: &str) -> Self {
        Self {
            cpd_base: base.to_string(),
            ml_base: base.to_string(),
            iam_base: base.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            list_limit: 100,
            precision: 2,
            preview_rows: 20,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cpd_base: DEFAULT_CPD_BASE.to_string(),
            ml_base: DEFAULT_ML_BASE.to_string(),
            iam_base: DEFAULT_IAM_BASE.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            list_limit: 100,
            precision: 2,
            preview_rows: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_public_endpoints() {
        let cfg = Config::default();
        assert_eq!(cfg.cpd_base, DEFAULT_CPD_BASE);
        assert_eq!(cfg.ml_base, DEFAULT_ML_BASE);
        assert_eq!(cfg.iam_base, DEFAULT_IAM_BASE);
        assert_eq!(cfg.api_version, "2021-01-01");
        assert_eq!(cfg.list_limit, 100);
        assert_eq!(cfg.precision, 2);
        assert_eq!(cfg.preview_rows, 20);
    }

    #[test]
    fn with_bases_rewrites_all_three_hosts() {
        let cfg = Config::with_bases("http://127.0.0.1:9999");
        assert_eq!(cfg.cpd_base, cfg.ml_base);
        assert_eq!(cfg.ml_base, cfg.iam_base);
        assert_eq!(cfg.iam_base, "http://127.0.0.1:9999");
    }
}
