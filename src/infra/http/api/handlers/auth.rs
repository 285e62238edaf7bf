//! Registration and login.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use pulseboard_api_types::{LoginRequest, RegisterRequest, UserResponse};

use super::json_body;
use crate::application::users::RegisterCommand;
use crate::infra::http::api::error::{ApiError, user_to_api};
use crate::infra::http::api::models::user_view;
use crate::infra::http::api::state::ApiState;

pub async fn register(
    State(state): State<ApiState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload)?;
    let registration = state
        .users
        .register(RegisterCommand {
            username: request.username,
            email: request.email,
            password: request.password,
        })
        .await
        .map_err(user_to_api)?;

    let message = if registration.first_user {
        "Account created with administrator access"
    } else {
        "Account created"
    };

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            success: true,
            user: user_view(&registration.user),
            message: message.to_string(),
        }),
    ))
}

pub async fn login(
    State(state): State<ApiState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let request = json_body(payload)?;
    let user = state
        .users
        .login(request.email.as_deref(), request.password.as_deref())
        .await
        .map_err(user_to_api)?;

    Ok(Json(UserResponse {
        success: true,
        user: user_view(&user),
        message: "Login successful".to_string(),
    }))
}
