//! Deployment resolution.
//!
//! Two dependent calls: deployment details first (backing asset id, asset
//! kind, serving URL), then the backing model/function asset, distilled into
//! a `ModelDescriptor`. The second call failing is a partial success: the
//! caller still gets the deployment details, plus the error that kept the
//! descriptor empty.

use serde::Deserialize;

use crate::error::{PlatformError, PlatformResult};
use crate::logging::Domain;
use crate::platform::{AuthToken, PlatformClient};

/// What a deployment serves. The asset-detail endpoint segment derives from
/// this, and anything else the platform reports is a shape mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Model,
    Function,
}

impl AssetKind {
    pub fn from_wire(s: &str) -> PlatformResult<Self> {
        match s {
            "model" => Ok(AssetKind::Model),
            "function" => Ok(AssetKind::Function),
            other => Err(PlatformError::shape(format!(
                "unknown deployed_asset_type: {}",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Model => "model",
            AssetKind::Function => "function",
        }
    }

    pub fn path_segment(&self) -> &'static str {
        match self {
            AssetKind::Model => "models",
            AssetKind::Function => "functions",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentDetails {
    pub id: String,
    pub name: Option<String>,
    pub asset_id: String,
    pub asset_kind: AssetKind,
    /// Absent for deployments without online serving; scoring requires it.
    pub serving_url: Option<String>,
}

/// Everything the inspection pages need from the backing asset.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor {
    /// Asset id, injected as MODEL_ID when triggering retraining jobs.
    pub id: String,
    pub kind: AssetKind,
    /// Ordered expected input field names, when the asset declares a schema.
    pub input_fields: Option<Vec<String>>,
    /// Precomputed explainability payload, when present.
    pub shap: Option<ShapPayload>,
    /// Flat "{group}_{metric}" map feeding the metric pivot.
    pub metrics: Option<Vec<(String, f64)>>,
}

/// Precomputed SHAP block stored under the asset's custom attributes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShapPayload {
    pub values: Vec<Vec<f64>>,
    #[serde(default)]
    pub expected_value: f64,
    pub feature_names: Vec<String>,
    pub data: Vec<Vec<f64>>,
}

/// Outcome of `resolve_deployment`: details always present, descriptor only
/// when the second call succeeded, otherwise the error that kept it away.
#[derive(Debug, Clone)]
pub struct DeploymentResolution {
    pub deployment: DeploymentDetails,
    pub descriptor: Option<ModelDescriptor>,
    pub descriptor_error: Option<PlatformError>,
}

// ============================================================================
// Wire shapes
// ============================================================================

#[derive(Deserialize)]
struct DeploymentWire {
    metadata: WireIdMeta,
    entity: DeploymentEntity,
}

#[derive(Deserialize)]
struct WireIdMeta {
    id: String,
}

#[derive(Deserialize)]
struct DeploymentEntity {
    asset: AssetRef,
    deployed_asset_type: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    status: DeploymentStatus,
}

#[derive(Deserialize)]
struct AssetRef {
    id: String,
}

#[derive(Deserialize, Default)]
struct DeploymentStatus {
    #[serde(default)]
    serving_urls: Vec<String>,
}

#[derive(Deserialize)]
struct AssetWire {
    metadata: WireIdMeta,
    #[serde(default)]
    entity: AssetEntity,
}

#[derive(Deserialize, Default)]
struct AssetEntity {
    #[serde(default)]
    schemas: Option<SchemasBlock>,
    #[serde(default)]
    custom: Option<CustomBlock>,
    #[serde(default)]
    metrics: Vec<MetricsEntry>,
}

#[derive(Deserialize)]
struct SchemasBlock {
    #[serde(default)]
    input: Vec<SchemaDef>,
}

#[derive(Deserialize)]
struct SchemaDef {
    #[serde(default)]
    fields: Vec<SchemaField>,
}

#[derive(Deserialize)]
struct SchemaField {
    name: String,
}

#[derive(Deserialize, Default)]
struct CustomBlock {
    #[serde(default)]
    shap: Option<ShapPayload>,
}

#[derive(Deserialize)]
struct MetricsEntry {
    #[serde(default)]
    ml_metrics: serde_json::Map<String, serde_json::Value>,
}

fn descriptor_from_wire(kind: AssetKind, wire: AssetWire) -> ModelDescriptor {
    let input_fields = wire
        .entity
        .schemas
        .and_then(|s| s.input.into_iter().next())
        .map(|def| def.fields.into_iter().map(|f| f.name).collect::<Vec<_>>())
        .filter(|fields: &Vec<String>| !fields.is_empty());

    let shap = wire.entity.custom.and_then(|c| c.shap);

    let metrics = wire.entity.metrics.into_iter().next().and_then(|entry| {
        let flat: Vec<(String, f64)> = entry
            .ml_metrics
            .into_iter()
            .filter_map(|(k, v)| v.as_f64().map(|n| (k, n)))
            .collect();
        if flat.is_empty() {
            None
        } else {
            Some(flat)
        }
    });

    ModelDescriptor {
        id: wire.metadata.id,
        kind,
        input_fields,
        shap,
        metrics,
    }
}

// ============================================================================
// Operations
// ============================================================================

impl PlatformClient {
    pub async fn get_deployment(
        &self,
        token: &AuthToken,
        space_id: &str,
        deployment_id: &str,
    ) -> PlatformResult<DeploymentDetails> {
        let url = format!("{}/ml/v4/deployments/{}", self.config().ml_base, deployment_id);
        let req = self.authed(
            self.http().get(&url).query(&[
                ("space_id", space_id),
                ("version", self.config().api_version.as_str()),
            ]),
            token,
        );
        let body = self
            .send_for_text(Domain::Deployment, "GET", "/ml/v4/deployments/{id}", req)
            .await
            .map_err(PlatformError::deployment)?;
        let wire: DeploymentWire =
            serde_json::from_str(&body).map_err(|e| PlatformError::deployment(e.to_string()))?;

        let asset_kind = AssetKind::from_wire(&wire.entity.deployed_asset_type)?;
        Ok(DeploymentDetails {
            id: wire.metadata.id,
            name: wire.entity.name,
            asset_id: wire.entity.asset.id,
            asset_kind,
            serving_url: wire.entity.status.serving_urls.into_iter().next(),
        })
    }

    pub async fn get_model_descriptor(
        &self,
        token: &AuthToken,
        space_id: &str,
        deployment: &DeploymentDetails,
    ) -> PlatformResult<ModelDescriptor> {
        let url = format!(
            "{}/ml/v4/{}/{}",
            self.config().ml_base,
            deployment.asset_kind.path_segment(),
            deployment.asset_id
        );
        let req = self.authed(
            self.http().get(&url).query(&[
                ("space_id", space_id),
                ("version", self.config().api_version.as_str()),
            ]),
            token,
        );
        let body = self
            .send_for_text(Domain::Deployment, "GET", "/ml/v4/{kind}/{id}", req)
            .await
            .map_err(PlatformError::deployment)?;
        let wire: AssetWire =
            serde_json::from_str(&body).map_err(|e| PlatformError::deployment(e.to_string()))?;
        Ok(descriptor_from_wire(deployment.asset_kind, wire))
    }

    /// Both calls in sequence. The deployment call failing fails the whole
    /// resolution; the asset call failing keeps the deployment details and
    /// reports why the descriptor is missing.
    pub async fn resolve_deployment(
        &self,
        token: &AuthToken,
        space_id: &str,
        deployment_id: &str,
    ) -> PlatformResult<DeploymentResolution> {
        let deployment = self.get_deployment(token, space_id, deployment_id).await?;
        match self.get_model_descriptor(token, space_id, &deployment).await {
            Ok(descriptor) => Ok(DeploymentResolution {
                deployment,
                descriptor: Some(descriptor),
                descriptor_error: None,
            }),
            Err(err) => Ok(DeploymentResolution {
                deployment,
                descriptor: None,
                descriptor_error: Some(err),
            }),
        }
    }
}
