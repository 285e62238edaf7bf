//! HTTP image hosting service.
//!
//! Uploads are `POST {endpoint}` as multipart (`file`, `folder`); the service answers with
//! JSON carrying the public URL and identifier. Deletion is `DELETE {endpoint}/{public_id}`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, multipart};
use serde::Deserialize;
use url::Url;

use crate::application::images::{ImageHost, ImageHostError, ImageUpload, StoredImage};

#[derive(Debug, Clone)]
pub struct RemoteImageHost {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
    folder: String,
}

#[derive(Debug, Deserialize)]
struct UploadReply {
    #[serde(alias = "secure_url")]
    url: String,
    #[serde(alias = "publicId")]
    public_id: String,
}

impl RemoteImageHost {
    pub fn new(
        endpoint: Url,
        api_key: Option<String>,
        folder: String,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("pulseboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            folder,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_key.as_deref() {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    fn delete_url(&self, public_id: &str) -> Result<Url, ImageHostError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| ImageHostError::Rejected("endpoint cannot be a base URL".to_string()))?
            .pop_if_empty()
            .push(public_id);
        Ok(url)
    }
}

fn transport(err: reqwest::Error) -> ImageHostError {
    ImageHostError::Transport(err.to_string())
}

#[async_trait]
impl ImageHost for RemoteImageHost {
    async fn upload(&self, image: ImageUpload) -> Result<StoredImage, ImageHostError> {
        let part = multipart::Part::bytes(image.data.to_vec())
            .file_name(image.filename)
            .mime_str(&image.content_type)
            .map_err(transport)?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("folder", self.folder.clone());

        let response = self
            .authorize(self.client.post(self.endpoint.clone()))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageHostError::Rejected(format!(
                "status {status} body {body}"
            )));
        }

        let reply: UploadReply = response.json().await.map_err(transport)?;
        Ok(StoredImage {
            url: reply.url,
            public_id: reply.public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<bool, ImageHostError> {
        let url = self.delete_url(public_id)?;
        let response = self
            .authorize(self.client.delete(url))
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(ImageHostError::Rejected(format!(
                "delete returned status {status}"
            ))),
        }
    }
}
