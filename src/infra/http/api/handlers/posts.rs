//! Post handlers: listing, authoring and moderation.

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use pulseboard_api_types::{ActionResponse, PostUpdatedResponse, PostView, RejectResponse};
use serde::Deserialize;

use super::{ActorQuery, AdminQuery, RejectQuery, multipart_body, query_params, read_multipart};
use crate::application::posts::{CreatePostCommand, EditPostCommand};
use crate::domain::types::PostStatus;
use crate::infra::http::api::error::{ApiError, post_to_api};
use crate::infra::http::api::models::{post_view, post_with_author_view};
use crate::infra::http::api::state::ApiState;

#[derive(Debug, Default, Deserialize)]
pub struct PostListQuery {
    pub status: Option<PostStatus>,
}

pub async fn list_posts(
    State(state): State<ApiState>,
    query: Result<Query<PostListQuery>, QueryRejection>,
) -> Result<Json<Vec<PostView>>, ApiError> {
    let query = query_params(query)?;
    let posts = state
        .posts
        .list_posts(query.status)
        .await
        .map_err(post_to_api)?;

    Ok(Json(posts.iter().map(post_with_author_view).collect()))
}

pub async fn get_post(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<PostView>, ApiError> {
    let post = state.posts.get_post(&id).await.map_err(post_to_api)?;
    Ok(Json(post_with_author_view(&post)))
}

pub async fn create_post(
    State(state): State<ApiState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = read_multipart(multipart_body(multipart)?, "image").await?;
    let command = CreatePostCommand {
        title: form.take_text("title").unwrap_or_default(),
        subtitle: form.take_text("subtitle"),
        content: form.take_text("content").unwrap_or_default(),
        author_id: form
            .take_text("author_id")
            .or_else(|| form.take_text("authorId")),
        image: form.image.take(),
    };

    let created = state
        .posts
        .create_post(command)
        .await
        .map_err(post_to_api)?;

    Ok((
        StatusCode::CREATED,
        Json(PostUpdatedResponse {
            success: true,
            message: "Post created".to_string(),
            post: post_with_author_view(&created),
        }),
    ))
}

pub async fn approve_post(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    query: Result<Query<AdminQuery>, QueryRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let query = query_params(query)?;
    state
        .posts
        .approve_post(&id, query.admin_id.as_deref())
        .await
        .map_err(post_to_api)?;

    Ok(Json(ActionResponse {
        success: true,
        message: "Post approved".to_string(),
    }))
}

pub async fn reject_post(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    query: Result<Query<RejectQuery>, QueryRejection>,
) -> Result<Json<RejectResponse>, ApiError> {
    let query = query_params(query)?;
    let (_, reason) = state
        .posts
        .reject_post(&id, query.admin_id.as_deref(), query.reason.as_deref())
        .await
        .map_err(post_to_api)?;

    Ok(Json(RejectResponse {
        success: true,
        message: "Post rejected".to_string(),
        reason,
    }))
}

pub async fn delete_post(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    query: Result<Query<AdminQuery>, QueryRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let query = query_params(query)?;
    state
        .posts
        .delete_post(&id, query.admin_id.as_deref())
        .await
        .map_err(post_to_api)?;

    Ok(Json(ActionResponse {
        success: true,
        message: "Post deleted".to_string(),
    }))
}

pub async fn edit_post(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    query: Result<Query<ActorQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PostUpdatedResponse>, ApiError> {
    let query = query_params(query)?;
    let mut form = read_multipart(multipart_body(multipart)?, "image").await?;
    let command = EditPostCommand {
        title: form.take_text("title").unwrap_or_default(),
        subtitle: form.take_text("subtitle"),
        content: form.take_text("content").unwrap_or_default(),
        image: form.image.take(),
    };

    let updated = state
        .posts
        .edit_post(&id, query.user_id.as_deref(), command)
        .await
        .map_err(post_to_api)?;

    Ok(Json(PostUpdatedResponse {
        success: true,
        message: "Post updated".to_string(),
        post: post_view(&updated.post, &updated.author),
    }))
}
