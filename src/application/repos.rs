//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::entities::{PostRecord, PostWithAuthor, UserRecord, UserWithPostCount};
use crate::domain::types::{PostStatus, UserRole};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub role: UserRole,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy)]
pub struct UpdateUserRoleParams {
    pub id: Uuid,
    pub role: UserRole,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
    pub author_id: Uuid,
    pub status: PostStatus,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct UpdatePostContentParams {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct UpdatePostStatusParams {
    pub id: Uuid,
    pub status: PostStatus,
    pub rejected_reason: Option<String>,
    pub updated_at: OffsetDateTime,
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError>;

    /// Any account already holding either the email or the username.
    async fn find_conflicting(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<UserRecord>, RepoError>;

    /// Newest accounts first.
    async fn list_with_post_counts(&self) -> Result<Vec<UserWithPostCount>, RepoError>;

    async fn count_users(&self, role: Option<UserRole>) -> Result<u64, RepoError>;

    async fn count_created_since(&self, since: OffsetDateTime) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait UsersWriteRepo: Send + Sync {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError>;

    async fn update_user_role(&self, params: UpdateUserRoleParams)
    -> Result<UserRecord, RepoError>;
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError>;

    async fn find_with_author(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError>;

    /// Newest posts first, optionally restricted to one status.
    async fn list_with_authors(
        &self,
        status: Option<PostStatus>,
    ) -> Result<Vec<PostWithAuthor>, RepoError>;

    async fn count_posts(&self, status: Option<PostStatus>) -> Result<u64, RepoError>;

    async fn count_created_since(&self, since: OffsetDateTime) -> Result<u64, RepoError>;

    async fn total_likes(&self) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;

    async fn update_post_content(
        &self,
        params: UpdatePostContentParams,
    ) -> Result<PostRecord, RepoError>;

    async fn update_post_status(
        &self,
        params: UpdatePostStatusParams,
    ) -> Result<PostRecord, RepoError>;

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError>;
}
