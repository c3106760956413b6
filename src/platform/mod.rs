//! Authenticated client for the data/ML platform.
//!
//! Each operation issues one round of HTTP calls and normalizes the response
//! into typed results. Remote failures are reported, never retried, and never
//! fatal: the raw response body travels back verbatim inside the error so the
//! user sees exactly what the platform said. Timeouts are whatever the HTTP
//! client defaults to.

use reqwest::Client;
use std::time::Instant;

use crate::config::Config;
use crate::logging::{self, Domain};

pub mod auth;
pub mod catalog;
pub mod dataset;
pub mod deployment;
pub mod jobs;
pub mod scoring;

pub use auth::AuthToken;
pub use deployment::{
    AssetKind, DeploymentDetails, DeploymentResolution, ModelDescriptor, ShapPayload,
};
pub use jobs::JobRun;
pub use scoring::{FixedScorer, Prediction, Scorer};

/// A (display name, opaque id) pair. Names are not unique, ids are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    pub id: String,
}

impl Resource {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self { name: name.into(), id: id.into() }
    }

    /// Dropdown display form.
    pub fn label(&self) -> String {
        format!("{} (id: {})", self.name, self.id)
    }
}

pub struct PlatformClient {
    client: Client,
    config: Config,
}

impl PlatformClient {
    pub fn new(config: Config) -> Self {
        Self { client: Client::new(), config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// Attach the bearer header the way every data-plane call expects it.
    pub(crate) fn authed(
        &self,
        req: reqwest::RequestBuilder,
        token: &AuthToken,
    ) -> reqwest::RequestBuilder {
        req.header(reqwest::header::AUTHORIZATION, token.bearer())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
    }

    /// Send a request and hand back the body text. Non-2xx responses and
    /// transport failures land in `Err` with the body (or the transport
    /// error's message) so callers can wrap it in their own taxonomy variant
    /// without losing a byte of what the platform returned.
    pub(crate) async fn send_for_text(
        &self,
        domain: Domain,
        method: &str,
        path: &str,
        req: reqwest::RequestBuilder,
    ) -> Result<String, String> {
        let started = Instant::now();
        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(err) => {
                logging::log_http(domain, method, path, 0, elapsed_ms(started));
                return Err(err.to_string());
            }
        };
        let status = resp.status();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(err) => {
                logging::log_http(domain, method, path, status.as_u16(), elapsed_ms(started));
                return Err(err.to_string());
            }
        };
        logging::log_http(domain, method, path, status.as_u16(), elapsed_ms(started));
        if status.is_success() {
            Ok(body)
        } else {
            Err(body)
        }
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
