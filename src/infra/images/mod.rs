//! Image host adapters.

mod filesystem;
mod placeholder;
mod remote;

pub use filesystem::FilesystemImageHost;
pub use placeholder::PlaceholderImageHost;
pub use remote::RemoteImageHost;

use std::sync::Arc;

use crate::application::images::ImageHost;
use crate::config::{ImageProvider, ImageSettings};
use crate::infra::error::InfraError;

/// The configured host, plus the disk-backed store when files are served locally.
pub struct ImageHosts {
    pub host: Arc<dyn ImageHost>,
    pub local: Option<Arc<FilesystemImageHost>>,
}

/// Build the image host selected by configuration.
pub fn from_settings(settings: &ImageSettings) -> Result<ImageHosts, InfraError> {
    match &settings.provider {
        ImageProvider::Unconfigured => Ok(ImageHosts {
            host: Arc::new(PlaceholderImageHost::new(settings.placeholder_url.clone())),
            local: None,
        }),
        ImageProvider::Filesystem {
            directory,
            public_base_url,
        } => {
            let local = Arc::new(
                FilesystemImageHost::new(directory.clone(), public_base_url.clone()).map_err(
                    |err| {
                        InfraError::ImageHost(format!(
                            "failed to prepare image directory {}: {err}",
                            directory.display()
                        ))
                    },
                )?,
            );
            Ok(ImageHosts {
                host: local.clone(),
                local: Some(local),
            })
        }
        ImageProvider::Remote {
            endpoint,
            api_key,
            folder,
        } => {
            let remote = RemoteImageHost::new(endpoint.clone(), api_key.clone(), folder.clone())
                .map_err(|err| InfraError::ImageHost(err.to_string()))?;
            Ok(ImageHosts {
                host: Arc::new(remote),
                local: None,
            })
        }
    }
}
