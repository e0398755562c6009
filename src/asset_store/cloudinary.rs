/// Cloudinary-compatible remote asset store
use crate::{
    asset_store::{AssetStore, ImageTransformation, UploadedAsset},
    error::{ApiError, ApiResult},
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, warn};

/// Remote asset store speaking the Cloudinary upload API.
///
/// Requests are signed with SHA-256; the account must be configured for
/// SHA-256 signatures.
#[derive(Clone)]
pub struct CloudinaryAssetStore {
    client: reqwest::Client,
    api_base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl CloudinaryAssetStore {
    pub fn new(
        api_base_url: String,
        cloud_name: String,
        api_key: String,
        api_secret: String,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            cloud_name,
            api_key,
            api_secret,
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{}", self.api_base_url, self.cloud_name, action)
    }

    fn signature(&self, params: &[(&str, &str)]) -> String {
        sign_params(params, &self.api_secret)
    }

    /// Extract the API's error message from a non-success response
    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => format!("{} ({})", envelope.error.message, status),
            Err(_) => format!("HTTP {}", status),
        }
    }
}

/// Sign request parameters: sorted `key=value` pairs joined by `&`, secret
/// appended, SHA-256 hex digest.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl AssetStore for CloudinaryAssetStore {
    async fn upload(
        &self,
        data: Vec<u8>,
        file_name: &str,
        transformation: &ImageTransformation,
    ) -> ApiResult<UploadedAsset> {
        let timestamp = Utc::now().timestamp().to_string();
        let transformation = transformation.to_cloudinary();
        let signature = self.signature(&[
            ("timestamp", timestamp.as_str()),
            ("transformation", transformation.as_str()),
        ]);

        let form = Form::new()
            .part("file", Part::bytes(data).file_name(file_name.to_string()))
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("transformation", transformation)
            .text("signature", signature);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::UploadFailure(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let message = Self::error_message(response).await;
            warn!("Asset upload rejected: {}", message);
            return Err(ApiError::UploadFailure(message));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| ApiError::UploadFailure(format!("Invalid upload response: {}", e)))?;

        let url = body.secure_url.or(body.url).ok_or_else(|| {
            ApiError::UploadFailure("Upload response did not include a URL".to_string())
        })?;

        debug!("Uploaded asset {}", body.public_id);

        Ok(UploadedAsset {
            public_id: body.public_id,
            url,
        })
    }

    async fn delete(&self, public_id: &str) -> ApiResult<()> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.signature(&[
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
        ]);

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&[
                ("public_id", public_id),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.api_key.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                ApiError::RemoteDeletionFailure(format!("Destroy request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let message = Self::error_message(response).await;
            return Err(ApiError::RemoteDeletionFailure(message));
        }

        let body: DestroyResponse = response.json().await.map_err(|e| {
            ApiError::RemoteDeletionFailure(format!("Invalid destroy response: {}", e))
        })?;

        // Anything but "ok" (e.g. "not found") leaves the asset unconfirmed
        if body.result != "ok" {
            return Err(ApiError::RemoteDeletionFailure(format!(
                "Asset {} not deleted: {}",
                public_id, body.result
            )));
        }

        Ok(())
    }
}
