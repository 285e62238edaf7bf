//! Image hosting collaborator.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageHostError {
    #[error("image host rejected the upload: {0}")]
    Rejected(String),
    #[error("image host request failed: {0}")]
    Transport(String),
    #[error("image storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub url: String,
    pub public_id: String,
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, image: ImageUpload) -> Result<StoredImage, ImageHostError>;

    /// Releases a stored image; `Ok(false)` when the host no longer knows the identifier.
    async fn delete(&self, public_id: &str) -> Result<bool, ImageHostError>;
}

/// Accepts only `image/*` payloads no larger than `max_bytes`.
pub fn validate_image(image: &ImageUpload, max_bytes: u64) -> Result<(), String> {
    if !image.content_type.starts_with("image/") {
        return Err("file must be an image".to_string());
    }
    if image.data.len() as u64 > max_bytes {
        let mib = max_bytes as f64 / (1024.0 * 1024.0);
        return Err(format!("image must be smaller than {mib:.0} MiB"));
    }
    Ok(())
}
