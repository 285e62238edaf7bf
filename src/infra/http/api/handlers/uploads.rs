use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use pulseboard_api_types::UploadResponse;

use super::{multipart_body, read_multipart};
use crate::infra::http::api::error::{ApiError, post_to_api};
use crate::infra::http::api::state::ApiState;

pub async fn upload_image(
    State(state): State<ApiState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let form = read_multipart(multipart_body(multipart)?, "image").await?;
    let image = form
        .image
        .ok_or_else(|| ApiError::bad_request("no image provided", None))?;

    let stored = state
        .posts
        .upload_image(image)
        .await
        .map_err(post_to_api)?;

    Ok(Json(UploadResponse {
        success: true,
        url: stored.url,
        public_id: stored.public_id,
    }))
}
