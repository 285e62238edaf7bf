use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pulseboard_api_types::{ApiErrorBody, ApiErrorMessage};
use tracing::error;

use crate::application::access::AccessError;
use crate::application::error::ErrorReport;
use crate::application::posts::PostServiceError;
use crate::application::repos::RepoError;
use crate::application::users::UserServiceError;

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const FORBIDDEN: &str = "forbidden";
    pub const NOT_FOUND: &str = "not_found";
    pub const DUPLICATE: &str = "duplicate";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const INTEGRITY: &str = "integrity_error";
    pub const DB_TIMEOUT: &str = "db_timeout";
    pub const REPO: &str = "repo_error";
    pub const UPLOAD: &str = "upload_error";
    pub const CREDENTIALS: &str = "credential_error";
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: Cow<'static, str>,
    hint: Option<String>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: impl Into<Cow<'static, str>>,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            hint,
        }
    }

    pub fn bad_request(message: impl Into<Cow<'static, str>>, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message, hint)
    }

    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, codes::UNAUTHORIZED, message, None)
    }

    pub fn forbidden(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::FORBIDDEN, codes::FORBIDDEN, message, None)
    }

    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message, None)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = match self.hint.as_deref() {
            Some(hint) => format!("{}: {} ({hint})", self.code, self.message),
            None => format!("{}: {}", self.code, self.message),
        };
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.into_owned(),
                hint: self.hint,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        ErrorReport::from_message("infra::http::api", self.status, detail).attach(&mut response);
        response
    }
}

fn not_found_entity(entity: &'static str) -> ApiError {
    match entity {
        "post" => ApiError::not_found("Post not found"),
        "user" => ApiError::not_found("User not found"),
        other => ApiError::not_found(format!("{other} not found")),
    }
}

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::DUPLICATE,
            "Duplicate record",
            Some(constraint),
        ),
        RepoError::NotFound => ApiError::not_found("Resource not found"),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            Some(message),
        ),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::INTEGRITY,
            "Integrity constraint violated",
            Some(message),
        ),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "Database timeout",
            None,
        ),
        RepoError::Persistence(message) => {
            error!(target = "pulseboard::http", error = %message, "persistence failure");
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                codes::REPO,
                "Internal server error",
                None,
            )
        }
    }
}

pub(crate) fn access_to_api(err: AccessError) -> ApiError {
    match err {
        AccessError::MissingActor => ApiError::bad_request(err.to_string(), None),
        AccessError::UnknownActor | AccessError::NotAdmin => {
            ApiError::forbidden("Administrator access required")
        }
        AccessError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn post_to_api(err: PostServiceError) -> ApiError {
    match err {
        PostServiceError::Validation(message) => ApiError::bad_request(message, None),
        PostServiceError::NotFound { entity } => not_found_entity(entity),
        PostServiceError::Forbidden(message) => ApiError::forbidden(message),
        PostServiceError::Image(image) => {
            error!(target = "pulseboard::images", error = %image, "image host failure");
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                codes::UPLOAD,
                "Image upload failed",
                None,
            )
        }
        PostServiceError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn user_to_api(err: UserServiceError) -> ApiError {
    match err {
        UserServiceError::Validation(message) => ApiError::bad_request(message, None),
        UserServiceError::Duplicate(message) => {
            ApiError::new(StatusCode::BAD_REQUEST, codes::DUPLICATE, message, None)
        }
        UserServiceError::InvalidCredentials => ApiError::unauthorized("Invalid email or password"),
        UserServiceError::NotFound { entity } => not_found_entity(entity),
        UserServiceError::Forbidden(message) => ApiError::forbidden(message),
        UserServiceError::Credential(credential) => {
            error!(target = "pulseboard::users", error = %credential, "credential store failure");
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                codes::CREDENTIALS,
                "Internal server error",
                None,
            )
        }
        UserServiceError::Repo(repo) => repo_to_api(repo),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_follow_the_status_taxonomy() {
        let cases = [
            (
                post_to_api(PostServiceError::Validation("title is required".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                post_to_api(PostServiceError::NotFound { entity: "post" }),
                StatusCode::NOT_FOUND,
            ),
            (
                post_to_api(PostServiceError::Forbidden("no".into())),
                StatusCode::FORBIDDEN,
            ),
            (
                post_to_api(PostServiceError::Image(
                    crate::application::images::ImageHostError::Transport("down".into()),
                )),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                user_to_api(UserServiceError::InvalidCredentials),
                StatusCode::UNAUTHORIZED,
            ),
            (
                user_to_api(UserServiceError::Duplicate("email already registered")),
                StatusCode::BAD_REQUEST,
            ),
            (access_to_api(AccessError::NotAdmin), StatusCode::FORBIDDEN),
            (
                access_to_api(AccessError::MissingActor),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status(), expected);
        }
    }

    #[test]
    fn response_carries_report_for_logging() {
        let response = ApiError::bad_request("reason is required", None).into_response();
        let report = response.extensions().get::<ErrorReport>().unwrap();
        assert_eq!(report.status, StatusCode::BAD_REQUEST);
        assert!(report.messages[0].contains("reason is required"));
    }
}
