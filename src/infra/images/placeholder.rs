use async_trait::async_trait;
use time::OffsetDateTime;

use crate::application::images::{ImageHost, ImageHostError, ImageUpload, StoredImage};

const TEMP_PREFIX: &str = "temp_";

/// Stand-in used when no image host is configured: every upload resolves to the same
/// placeholder picture under a throwaway `temp_<millis>` identifier.
#[derive(Debug, Clone)]
pub struct PlaceholderImageHost {
    url: String,
}

impl PlaceholderImageHost {
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

#[async_trait]
impl ImageHost for PlaceholderImageHost {
    async fn upload(&self, _image: ImageUpload) -> Result<StoredImage, ImageHostError> {
        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        Ok(StoredImage {
            url: self.url.clone(),
            public_id: format!("{TEMP_PREFIX}{millis}"),
        })
    }

    /// Acknowledges placeholder ids and reports any other id as unknown.
    async fn delete(&self, public_id: &str) -> Result<bool, ImageHostError> {
        Ok(public_id.starts_with(TEMP_PREFIX))
    }
}
