//! Resource listings.
//!
//! Five read endpoints, five envelope shapes, one output shape: a uniform
//! `Vec<Resource>`. Listing errors keep the remote body so "no resources"
//! and "call failed" can never be confused by looking at list length.

use serde::Deserialize;

use crate::error::{PlatformError, PlatformResult, ResourceKind};
use crate::logging::Domain;
use crate::platform::{AuthToken, PlatformClient, Resource};

// ============================================================================
// Wire envelopes
// ============================================================================

#[derive(Deserialize)]
struct NamedEntity {
    name: String,
}

#[derive(Deserialize)]
struct GuidMeta {
    guid: String,
}

#[derive(Deserialize)]
struct IdMeta {
    id: String,
}

#[derive(Deserialize)]
struct ProjectList {
    resources: Vec<ProjectEntry>,
}

#[derive(Deserialize)]
struct ProjectEntry {
    entity: NamedEntity,
    metadata: GuidMeta,
}

#[derive(Deserialize)]
struct SearchResult {
    rows: Vec<SearchRow>,
}

#[derive(Deserialize)]
struct SearchRow {
    metadata: NamedMeta,
    artifact_id: String,
}

#[derive(Deserialize)]
struct NamedMeta {
    name: String,
}

#[derive(Deserialize)]
struct SpaceList {
    resources: Vec<SpaceEntry>,
}

#[derive(Deserialize)]
struct SpaceEntry {
    entity: NamedEntity,
    metadata: IdMeta,
}

#[derive(Deserialize)]
struct DeploymentList {
    resources: Vec<DeploymentEntry>,
}

#[derive(Deserialize)]
struct DeploymentEntry {
    entity: NamedEntity,
    metadata: IdMeta,
}

#[derive(Deserialize)]
struct JobList {
    results: Vec<JobEntry>,
}

#[derive(Deserialize)]
struct JobEntry {
    metadata: JobMeta,
}

#[derive(Deserialize)]
struct JobMeta {
    name: String,
    asset_id: String,
}

// ============================================================================
// Listing operations
// ============================================================================

impl PlatformClient {
    pub async fn list_projects(&self, token: &AuthToken) -> PlatformResult<Vec<Resource>> {
        let url = format!("{}/v2/projects", self.config().cpd_base);
        let limit = self.config().list_limit.to_string();
        let req = self.authed(self.http().get(&url).query(&[("limit", limit.as_str())]), token);
        let body = self
            .send_for_text(Domain::Catalog, "GET", "/v2/projects", req)
            .await
            .map_err(|detail| PlatformError::listing(ResourceKind::Project, detail))?;
        let list: ProjectList = serde_json::from_str(&body)
            .map_err(|e| PlatformError::listing(ResourceKind::Project, e.to_string()))?;
        Ok(list
            .resources
            .into_iter()
            .map(|p| Resource::new(p.entity.name, p.metadata.guid))
            .collect())
    }

    /// Catalog search for data assets scoped to one project.
    pub async fn list_datasets(
        &self,
        token: &AuthToken,
        project_id: &str,
    ) -> PlatformResult<Vec<Resource>> {
        let url = format!("{}/v3/search", self.config().cpd_base);
        let query = serde_json::json!({
            "query": {
                "bool": {
                    "must": [
                        {"match": {"metadata.artifact_type": "data_asset"}},
                        {"match": {"entity.assets.project_id": project_id}}
                    ]
                }
            }
        });
        let req = self.authed(self.http().post(&url), token).json(&query);
        let body = self
            .send_for_text(Domain::Catalog, "POST", "/v3/search", req)
            .await
            .map_err(|detail| PlatformError::listing(ResourceKind::Dataset, detail))?;
        let result: SearchResult = serde_json::from_str(&body)
            .map_err(|e| PlatformError::listing(ResourceKind::Dataset, e.to_string()))?;
        Ok(result
            .rows
            .into_iter()
            .map(|r| Resource::new(r.metadata.name, r.artifact_id))
            .collect())
    }

    pub async fn list_spaces(&self, token: &AuthToken) -> PlatformResult<Vec<Resource>> {
        let url = format!("{}/v2/spaces", self.config().cpd_base);
        let req = self.authed(self.http().get(&url), token);
        let body = self
            .send_for_text(Domain::Catalog, "GET", "/v2/spaces", req)
            .await
            .map_err(|detail| PlatformError::listing(ResourceKind::Space, detail))?;
        let list: SpaceList = serde_json::from_str(&body)
            .map_err(|e| PlatformError::listing(ResourceKind::Space, e.to_string()))?;
        Ok(list
            .resources
            .into_iter()
            .map(|s| Resource::new(s.entity.name, s.metadata.id))
            .collect())
    }

    pub async fn list_deployments(
        &self,
        token: &AuthToken,
        space_id: &str,
    ) -> PlatformResult<Vec<Resource>> {
        let url = format!("{}/ml/v4/deployments", self.config().ml_base);
        let req = self.authed(
            self.http().get(&url).query(&[
                ("space_id", space_id),
                ("version", self.config().api_version.as_str()),
            ]),
            token,
        );
        let body = self
            .send_for_text(Domain::Catalog, "GET", "/ml/v4/deployments", req)
            .await
            .map_err(|detail| PlatformError::listing(ResourceKind::Deployment, detail))?;
        let list: DeploymentList = serde_json::from_str(&body)
            .map_err(|e| PlatformError::listing(ResourceKind::Deployment, e.to_string()))?;
        Ok(list
            .resources
            .into_iter()
            .map(|d| Resource::new(d.entity.name, d.metadata.id))
            .collect())
    }

    pub async fn list_jobs(
        &self,
        token: &AuthToken,
        project_id: &str,
    ) -> PlatformResult<Vec<Resource>> {
        let url = format!("{}/v2/jobs", self.config().cpd_base);
        let req = self.authed(
            self.http().get(&url).query(&[("project_id", project_id)]),
            token,
        );
        let body = self
            .send_for_text(Domain::Catalog, "GET", "/v2/jobs", req)
            .await
            .map_err(|detail| PlatformError::listing(ResourceKind::Job, detail))?;
        let list: JobList = serde_json::from_str(&body)
            .map_err(|e| PlatformError::listing(ResourceKind::Job, e.to_string()))?;
        Ok(list
            .results
            .into_iter()
            .map(|j| Resource::new(j.metadata.name, j.metadata.asset_id))
            .collect())
    }
}
