//! Three-step dataset load.
//!
//! 1. Data-asset metadata, which names the attachment to fetch.
//! 2. Attachment metadata, which carries a short-lived signed download URL.
//! 3. The CSV bytes at that URL, streamed and parsed into a `Table`.
//!
//! The first failing step short-circuits; the error is tagged with the stage
//! so the user knows whether the catalog, the attachment record, or the file
//! itself was the problem. A non-CSV mime type only warns, the load still
//! runs (the platform sometimes stores CSVs under other types).

use futures_util::StreamExt;
use serde::Deserialize;
use url::Url;

use crate::error::{LoadStage, PlatformError, PlatformResult};
use crate::logging::{self, Domain, Level};
use crate::platform::{AuthToken, PlatformClient};
use crate::table::Table;

#[derive(Deserialize)]
struct DataAssetDetail {
    entity: DataAssetEntity,
    #[serde(default)]
    attachments: Vec<AttachmentRef>,
}

#[derive(Deserialize)]
struct DataAssetEntity {
    data_asset: DataAssetInfo,
}

#[derive(Deserialize)]
struct DataAssetInfo {
    #[serde(default)]
    mime_type: Option<String>,
}

#[derive(Deserialize)]
struct AttachmentRef {
    id: String,
}

#[derive(Deserialize)]
struct AttachmentDetail {
    url: String,
}

impl PlatformClient {
    pub async fn load_dataset(
        &self,
        token: &AuthToken,
        project_id: &str,
        dataset_id: &str,
    ) -> PlatformResult<Table> {
        // Step 1: data-asset metadata
        let url = format!("{}/v2/data_assets/{}", self.config().cpd_base, dataset_id);
        let req = self.authed(
            self.http().get(&url).query(&[("project_id", project_id)]),
            token,
        );
        let body = self
            .send_for_text(Domain::Dataset, "GET", "/v2/data_assets", req)
            .await
            .map_err(|detail| PlatformError::dataset(LoadStage::Metadata, detail))?;
        let detail: DataAssetDetail = serde_json::from_str(&body)
            .map_err(|e| PlatformError::dataset(LoadStage::Metadata, e.to_string()))?;

        match detail.entity.data_asset.mime_type.as_deref() {
            Some("text/csv") => {}
            other => logging::log(
                Level::Warn,
                Domain::Dataset,
                "mime_advisory",
                logging::obj(&[
                    ("mime", logging::v_str(other.unwrap_or("unknown"))),
                    (
                        "msg",
                        logging::v_str("dataset is not text/csv, attempting load anyway"),
                    ),
                ]),
            ),
        }

        let attachment_id = detail
            .attachments
            .first()
            .map(|a| a.id.clone())
            .ok_or_else(|| {
                PlatformError::dataset(LoadStage::Metadata, "data asset has no attachments")
            })?;

        // Step 2: attachment metadata with the signed URL
        let url = format!(
            "{}/v2/assets/{}/attachments/{}",
            self.config().cpd_base,
            dataset_id,
            attachment_id
        );
        let req = self.authed(
            self.http().get(&url).query(&[("project_id", project_id)]),
            token,
        );
        let body = self
            .send_for_text(Domain::Dataset, "GET", "/v2/assets/attachments", req)
            .await
            .map_err(|detail| PlatformError::dataset(LoadStage::Attachment, detail))?;
        let attachment: AttachmentDetail = serde_json::from_str(&body)
            .map_err(|e| PlatformError::dataset(LoadStage::Attachment, e.to_string()))?;

        let signed = Url::parse(&attachment.url)
            .map_err(|e| PlatformError::dataset(LoadStage::Attachment, e.to_string()))?;

        // Step 3: fetch and parse the CSV
        let table = self.fetch_csv(&signed).await?;
        logging::log(
            Level::Info,
            Domain::Dataset,
            "table_loaded",
            logging::obj(&[
                ("dataset_id", logging::v_str(dataset_id)),
                ("rows", serde_json::json!(table.n_rows())),
                ("cols", serde_json::json!(table.n_cols())),
            ]),
        );
        Ok(table)
    }

    /// Download from the signed URL (no auth header, the signature is in the
    /// URL) and parse. Only the URL path is logged; the query string holds
    /// the signature.
    async fn fetch_csv(&self, signed: &Url) -> PlatformResult<Table> {
        let resp = self
            .http()
            .get(signed.as_str())
            .send()
            .await
            .map_err(|e| PlatformError::dataset(LoadStage::Parse, e.to_string()))?;
        let status = resp.status();
        logging::log_http(Domain::Dataset, "GET", signed.path(), status.as_u16(), 0.0);
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_else(|_| status.to_string());
            return Err(PlatformError::dataset(LoadStage::Parse, body));
        }

        let mut stream = resp.bytes_stream();
        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| PlatformError::dataset(LoadStage::Parse, e.to_string()))?;
            bytes.extend_from_slice(&chunk);
        }

        Table::from_csv_bytes(&bytes).map_err(|e| PlatformError::dataset(LoadStage::Parse, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_detail_exposes_first_attachment() {
        let body = r#"{
            "entity": {"data_asset": {"mime_type": "text/csv"}},
            "attachments": [{"id": "att-1"}, {"id": "att-2"}]
        }"#;
        let detail: DataAssetDetail = serde_json::from_str(body).unwrap();
        assert_eq!(detail.attachments[0].id, "att-1");
        assert_eq!(detail.entity.data_asset.mime_type.as_deref(), Some("text/csv"));
    }

    #[test]
    fn missing_attachments_deserializes_as_empty() {
        let body = r#"{"entity": {"data_asset": {}}}"#;
        let detail: DataAssetDetail = serde_json::from_str(body).unwrap();
        assert!(detail.attachments.is_empty());
        assert!(detail.entity.data_asset.mime_type.is_none());
    }
}
