//! API handlers grouped by resource.

mod admin;
mod auth;
mod goal;
mod posts;
mod uploads;
mod users;

pub use admin::*;
pub use auth::*;
pub use goal::*;
pub use posts::*;
pub use uploads::*;
pub use users::*;

use std::collections::HashMap;

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Multipart, Query};
use serde::Deserialize;

use crate::application::images::ImageUpload;

use super::error::ApiError;

// ----- Extractor rejections -----

pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|err| ApiError::bad_request("invalid JSON body", Some(err.body_text())))
}

pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(params)| params)
        .map_err(|err| ApiError::bad_request("invalid query string", Some(err.body_text())))
}

pub(crate) fn multipart_body(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Multipart, ApiError> {
    multipart
        .map_err(|err| ApiError::bad_request("invalid multipart payload", Some(err.body_text())))
}

// ----- Shared query structs -----

#[derive(Debug, Default, Deserialize)]
pub struct AdminQuery {
    pub admin_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectQuery {
    pub admin_id: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActorQuery {
    pub user_id: Option<String>,
}

/// Text fields plus at most one file field, read from a multipart body.
#[derive(Debug, Default)]
pub(crate) struct MultipartForm {
    fields: HashMap<String, String>,
    pub image: Option<ImageUpload>,
}

impl MultipartForm {
    pub(crate) fn take_text(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }
}

/// Collects every text field and the file sent under `file_field`. Empty file parts count as
/// absent.
pub(crate) async fn read_multipart(
    mut multipart: Multipart,
    file_field: &str,
) -> Result<MultipartForm, ApiError> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request("invalid multipart payload", Some(err.to_string())))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == file_field {
            let filename = field.file_name().unwrap_or("image").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await.map_err(|err| {
                ApiError::bad_request("failed to read upload", Some(err.to_string()))
            })?;
            if !data.is_empty() {
                form.image = Some(ImageUpload {
                    filename,
                    content_type,
                    data,
                });
            }
            continue;
        }

        let value = field.text().await.map_err(|err| {
            ApiError::bad_request("invalid multipart field", Some(err.to_string()))
        })?;
        form.fields.insert(name, value);
    }

    Ok(form)
}
