/// Asset Store
///
/// Holds the actual image bytes behind each photo record. Supports a local
/// disk backend and a Cloudinary-compatible remote backend.

pub mod cloudinary;
pub mod disk;

pub use cloudinary::CloudinaryAssetStore;
pub use disk::DiskAssetStore;

use crate::error::ApiResult;
use async_trait::async_trait;

/// Asset store backend trait
///
/// Calls are made once; retry policy belongs to the caller.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store an image, applying the given transformation
    async fn upload(
        &self,
        data: Vec<u8>,
        file_name: &str,
        transformation: &ImageTransformation,
    ) -> ApiResult<UploadedAsset>;

    /// Delete a stored image by its public id
    async fn delete(&self, public_id: &str) -> ApiResult<()>;
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedAsset {
    pub public_id: String,
    pub url: String,
}

/// Crop strategy used when resizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropMode {
    /// Fill the box exactly, cropping overflow
    Fill,
}

/// Region favoured when cropping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gravity {
    Face,
}

/// Image transformation applied at upload time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageTransformation {
    pub width: u32,
    pub height: u32,
    pub crop: CropMode,
    pub gravity: Gravity,
}

/// Square profile thumbnail, cropped to fill, biased toward faces
pub const PROFILE_PHOTO_TRANSFORMATION: ImageTransformation = ImageTransformation {
    width: 500,
    height: 500,
    crop: CropMode::Fill,
    gravity: Gravity::Face,
};

impl ImageTransformation {
    /// Cloudinary transformation string, e.g. `c_fill,g_face,h_500,w_500`
    pub fn to_cloudinary(&self) -> String {
        let crop = match self.crop {
            CropMode::Fill => "fill",
        };
        let gravity = match self.gravity {
            Gravity::Face => "face",
        };

        format!(
            "c_{},g_{},h_{},w_{}",
            crop, gravity, self.height, self.width
        )
    }
}
