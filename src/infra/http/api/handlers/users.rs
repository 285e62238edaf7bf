use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use pulseboard_api_types::{RoleChangeRequest, UserListEntry, UserResponse};

use super::{AdminQuery, json_body, query_params};
use crate::infra::http::api::error::{ApiError, user_to_api};
use crate::infra::http::api::models::{user_list_entry, user_view};
use crate::infra::http::api::state::ApiState;

pub async fn list_users(
    State(state): State<ApiState>,
    query: Result<Query<AdminQuery>, QueryRejection>,
) -> Result<Json<Vec<UserListEntry>>, ApiError> {
    let query = query_params(query)?;
    let users = state
        .users
        .list_users(query.admin_id.as_deref())
        .await
        .map_err(user_to_api)?;

    Ok(Json(users.iter().map(user_list_entry).collect()))
}

pub async fn change_role(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    payload: Result<Json<RoleChangeRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let request = json_body(payload)?;

    let user = state
        .users
        .change_role(&id, request.role.as_deref(), request.admin_id.as_deref())
        .await
        .map_err(user_to_api)?;

    let message = format!("Role updated to {}", user.role.as_str());
    Ok(Json(UserResponse {
        success: true,
        user: user_view(&user),
        message,
    }))
}
