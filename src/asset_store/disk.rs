/// Disk-based asset store backend
use crate::{
    asset_store::{AssetStore, CropMode, ImageTransformation, UploadedAsset},
    error::{ApiError, ApiResult},
};
use async_trait::async_trait;
use image::{imageops::FilterType, ImageFormat};
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

/// Disk storage backend
///
/// Stores transformed images as JPEG on the local filesystem, sharded by the
/// first two characters of the public id. Files are served back under
/// `{public_base_url}/assets/{public_id}`.
#[derive(Clone)]
pub struct DiskAssetStore {
    base_path: PathBuf,
    public_base_url: String,
}

impl DiskAssetStore {
    /// Create a new disk storage backend
    pub fn new(base_path: PathBuf, public_base_url: String) -> Self {
        Self {
            base_path,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Get the file path for a public id
    ///
    /// Uses directory sharding: {base}/{first2chars}/{public_id}
    fn asset_path(&self, public_id: &str) -> PathBuf {
        if public_id.len() >= 2 {
            self.base_path.join(&public_id[0..2]).join(public_id)
        } else {
            self.base_path.join("_").join(public_id)
        }
    }

    /// Public ids are generated here; reject anything that could escape the base directory
    fn validate_public_id(public_id: &str) -> ApiResult<()> {
        let valid = !public_id.is_empty()
            && public_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-');

        if !valid {
            return Err(ApiError::Validation(format!(
                "Invalid asset id: {}",
                public_id
            )));
        }

        Ok(())
    }

    /// Read a stored asset
    pub async fn get(&self, public_id: &str) -> ApiResult<Option<Vec<u8>>> {
        Self::validate_public_id(public_id)?;

        match fs::read(self.asset_path(public_id)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ApiError::Internal(format!(
                "Failed to read asset {}: {}",
                public_id, e
            ))),
        }
    }

    /// Decode, resize/crop and re-encode as JPEG
    fn transform(data: &[u8], transformation: &ImageTransformation) -> ApiResult<Vec<u8>> {
        let img = image::load_from_memory(data)
            .map_err(|e| ApiError::UploadFailure(format!("Unsupported image: {}", e)))?;

        // No face detection locally; fill crops around the center
        let resized = match transformation.crop {
            CropMode::Fill => img.resize_to_fill(
                transformation.width,
                transformation.height,
                FilterType::Lanczos3,
            ),
        };

        let mut buf = Vec::new();
        resized
            .to_rgb8()
            .write_to(&mut std::io::Cursor::new(&mut buf), ImageFormat::Jpeg)
            .map_err(|e| ApiError::UploadFailure(format!("Failed to encode image: {}", e)))?;

        Ok(buf)
    }
}

#[async_trait]
impl AssetStore for DiskAssetStore {
    async fn upload(
        &self,
        data: Vec<u8>,
        file_name: &str,
        transformation: &ImageTransformation,
    ) -> ApiResult<UploadedAsset> {
        let transformation = *transformation;
        let encoded = tokio::task::spawn_blocking(move || Self::transform(&data, &transformation))
            .await
            .map_err(|e| ApiError::UploadFailure(format!("Transform task failed: {}", e)))??;

        let public_id = Uuid::new_v4().simple().to_string();
        let path = self.asset_path(&public_id);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                ApiError::UploadFailure(format!("Failed to create asset directory: {}", e))
            })?;
        }

        fs::write(&path, encoded).await.map_err(|e| {
            ApiError::UploadFailure(format!("Failed to write asset {}: {}", public_id, e))
        })?;

        tracing::debug!("Stored asset {} (from {}) on disk", public_id, file_name);

        Ok(UploadedAsset {
            url: format!("{}/assets/{}", self.public_base_url, public_id),
            public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> ApiResult<()> {
        Self::validate_public_id(public_id)
            .map_err(|e| ApiError::RemoteDeletionFailure(e.to_string()))?;

        match fs::remove_file(self.asset_path(public_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ApiError::RemoteDeletionFailure(format!(
                    "Asset {} not found",
                    public_id
                )))
            }
            Err(e) => Err(ApiError::RemoteDeletionFailure(format!(
                "Failed to delete asset {}: {}",
                public_id, e
            ))),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 90]));
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}
