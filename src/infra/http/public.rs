//! Non-API routes: health probe and locally stored images.

use std::io::ErrorKind;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{
        HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::error;

use crate::application::error::ErrorReport;
use crate::application::images::ImageHostError;
use crate::infra::db::PostgresRepositories;
use crate::infra::images::FilesystemImageHost;

use super::api::error::ApiError;

#[derive(Clone, Default)]
pub struct HttpState {
    /// Present when records live in Postgres; `/health` then probes the pool.
    pub db: Option<Arc<PostgresRepositories>>,
    /// Present when images are stored on local disk.
    pub local_images: Option<Arc<FilesystemImageHost>>,
}

/// 204 when the record store answers; 503 carrying the driver error otherwise.
pub async fn health(State(state): State<HttpState>) -> Response {
    let Some(db) = state.db.as_ref() else {
        return StatusCode::NO_CONTENT.into_response();
    };

    match db.health_check().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::public::health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

pub async fn serve_upload(State(state): State<HttpState>, Path(path): Path<String>) -> Response {
    const SOURCE: &str = "infra::http::public::serve_upload";

    let Some(storage) = state.local_images.as_ref() else {
        return ApiError::not_found("Upload not found").into_response();
    };

    match storage.read(&path).await {
        Ok(bytes) => build_upload_response(&path, bytes),
        Err(ImageHostError::Rejected(_)) => ApiError::not_found("Upload not found").into_response(),
        Err(ImageHostError::Io(err)) if err.kind() == ErrorKind::NotFound => {
            ApiError::not_found("Upload not found").into_response()
        }
        Err(err) => {
            error!(
                target = "pulseboard::http::uploads",
                path = %path,
                error = %err,
                "failed to read stored upload"
            );
            let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
            ErrorReport::from_error(SOURCE, StatusCode::INTERNAL_SERVER_ERROR, &err)
                .attach(&mut response);
            response
        }
    }
}

fn build_upload_response(path: &str, bytes: Bytes) -> Response {
    let length = bytes.len();
    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&length.to_string()) {
        headers.insert(CONTENT_LENGTH, value);
    }
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=31536000, immutable"),
    );

    response
}
