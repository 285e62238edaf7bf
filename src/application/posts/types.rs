use thiserror::Error;

use crate::application::access::AccessError;
use crate::application::images::{ImageHostError, ImageUpload};
use crate::application::repos::RepoError;
use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub enum PostServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("{0}")]
    Forbidden(String),
    #[error("image upload failed")]
    Image(#[from] ImageHostError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<AccessError> for PostServiceError {
    fn from(error: AccessError) -> Self {
        match error {
            AccessError::MissingActor => Self::Validation(error.to_string()),
            AccessError::UnknownActor => Self::NotFound { entity: "user" },
            AccessError::NotAdmin => Self::Forbidden(error.to_string()),
            AccessError::Repo(err) => Self::Repo(err),
        }
    }
}

impl From<DomainError> for PostServiceError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::Validation { message } => Self::Validation(message),
            DomainError::Forbidden { message } => Self::Forbidden(message),
            other @ DomainError::EmptyWindow { .. } => Self::Validation(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreatePostCommand {
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub author_id: Option<String>,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, Default)]
pub struct EditPostCommand {
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub image: Option<ImageUpload>,
}

pub fn ensure_non_empty(value: &str, field: &'static str) -> Result<(), PostServiceError> {
    if value.trim().is_empty() {
        return Err(PostServiceError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Blank subtitles are stored as absent.
pub(crate) fn normalize_subtitle(subtitle: Option<String>) -> Option<String> {
    subtitle.filter(|value| !value.trim().is_empty())
}
