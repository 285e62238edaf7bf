//! Filesystem image storage served back under `/uploads`.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use slug::slugify;
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;
use uuid::Uuid;

use crate::application::images::{ImageHost, ImageHostError, ImageUpload, StoredImage};

#[derive(Debug)]
pub struct FilesystemImageHost {
    root: PathBuf,
    public_base_url: String,
}

impl FilesystemImageHost {
    /// Storage rooted at `root`, created if missing.
    pub fn new(root: PathBuf, public_base_url: String) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            public_base_url,
        })
    }

    pub async fn read(&self, stored_path: &str) -> Result<Bytes, ImageHostError> {
        let absolute = self.resolve(stored_path)?;
        Ok(Bytes::from(fs::read(absolute).await?))
    }

    /// Maps a public identifier to a path under the root, refusing traversal.
    fn resolve(&self, stored_path: &str) -> Result<PathBuf, ImageHostError> {
        let relative = Path::new(stored_path);
        if stored_path.is_empty()
            || relative.is_absolute()
            || relative
                .components()
                .any(|component| matches!(component, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(ImageHostError::Rejected(format!(
                "invalid stored path `{stored_path}`"
            )));
        }

        Ok(self.root.join(relative))
    }

    fn build_stored_path(&self, original_name: &str) -> String {
        let (year, month, day) = time::OffsetDateTime::now_utc().to_calendar_date();
        let identifier = Uuid::new_v4();
        let filename = sanitize_filename(original_name);
        format!("{year}/{:02}/{day:02}/{identifier}-{filename}", month as u8)
    }
}

#[async_trait]
impl ImageHost for FilesystemImageHost {
    async fn upload(&self, image: ImageUpload) -> Result<StoredImage, ImageHostError> {
        if image.data.is_empty() {
            return Err(ImageHostError::Rejected("image is empty".to_string()));
        }

        let stored_path = self.build_stored_path(&image.filename);
        let absolute = self.resolve(&stored_path)?;
        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&absolute).await?;
        if let Err(err) = file.write_all(&image.data).await {
            drop(file);
            let _ = fs::remove_file(&absolute).await;
            return Err(err.into());
        }
        file.flush().await?;

        let checksum = hex::encode(Sha256::digest(&image.data));
        debug!(
            target = "pulseboard::images",
            stored_path = %stored_path,
            size_bytes = image.data.len(),
            checksum = %checksum,
            "Stored image on disk"
        );

        Ok(StoredImage {
            url: format!("{}/{stored_path}", self.public_base_url),
            public_id: stored_path,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<bool, ImageHostError> {
        let Ok(absolute) = self.resolve(public_id) else {
            return Ok(false);
        };
        match fs::remove_file(&absolute).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(ImageHostError::Io(err)),
        }
    }
}

fn sanitize_filename(original: &str) -> String {
    let path = Path::new(original);
    let stem = path
        .file_stem()
        .and_then(|value| value.to_str())
        .unwrap_or("image");
    let mut base = slugify(stem);
    if base.is_empty() {
        base = "image".to_string();
    }

    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.trim_matches('.').to_ascii_lowercase())
        .filter(|value| !value.is_empty());

    match extension {
        Some(ext) => format!("{base}.{ext}"),
        None => base,
    }
}
