//! Account registration, login and role administration.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::access::{AccessControl, AccessError, parse_id};
use crate::application::clock::Clock;
use crate::application::credentials::{CredentialError, CredentialStore};
use crate::application::repos::{
    CreateUserParams, RepoError, UpdateUserRoleParams, UsersRepo, UsersWriteRepo,
};
use crate::domain::entities::{UserRecord, UserWithPostCount};
use crate::domain::types::UserRole;

pub const DEFAULT_AVATAR_URL: &str =
    "https://images.unsplash.com/photo-1535713875002-d1d0cf377fde?w=150&h=150&fit=crop&crop=face";

#[derive(Debug, Error)]
pub enum UserServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Duplicate(&'static str),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<AccessError> for UserServiceError {
    fn from(error: AccessError) -> Self {
        match error {
            AccessError::MissingActor => Self::Validation(error.to_string()),
            AccessError::UnknownActor | AccessError::NotAdmin => {
                Self::Forbidden("only administrators may manage users".to_string())
            }
            AccessError::Repo(err) => Self::Repo(err),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterCommand {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub user: UserRecord,
    /// The first account ever created becomes the administrator.
    pub first_user: bool,
}

#[derive(Clone)]
pub struct UserService {
    reader: Arc<dyn UsersRepo>,
    writer: Arc<dyn UsersWriteRepo>,
    access: AccessControl,
    credentials: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    pub fn new(
        reader: Arc<dyn UsersRepo>,
        writer: Arc<dyn UsersWriteRepo>,
        access: AccessControl,
        credentials: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reader,
            writer,
            access,
            credentials,
            clock,
        }
    }

    pub async fn register(&self, command: RegisterCommand) -> Result<Registration, UserServiceError> {
        let (Some(username), Some(email), Some(password)) = (
            non_blank(command.username),
            non_blank(command.email),
            command.password.filter(|value| !value.is_empty()),
        ) else {
            return Err(UserServiceError::Validation(
                "username, email and password are required".to_string(),
            ));
        };

        if let Some(existing) = self.reader.find_conflicting(&email, &username).await? {
            return Err(if existing.email == email {
                UserServiceError::Duplicate("this email is already registered")
            } else {
                UserServiceError::Duplicate("this username is already taken")
            });
        }

        let first_user = self.reader.count_users(None).await? == 0;
        let role = if first_user {
            UserRole::Admin
        } else {
            UserRole::User
        };
        let password_hash = self.credentials.hash(&password)?;

        let user = self
            .writer
            .create_user(CreateUserParams {
                username,
                email,
                password_hash,
                avatar: Some(DEFAULT_AVATAR_URL.to_string()),
                role,
                created_at: self.clock.now(),
            })
            .await
            .map_err(|err| match err {
                RepoError::Duplicate { .. } => {
                    UserServiceError::Duplicate("this email or username is already registered")
                }
                other => UserServiceError::Repo(other),
            })?;

        info!(
            target = "pulseboard::users",
            user_id = %user.id,
            role = user.role.as_str(),
            "Account registered"
        );

        Ok(Registration { user, first_user })
    }

    pub async fn login(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<UserRecord, UserServiceError> {
        let (Some(email), Some(password)) = (
            email.map(str::trim).filter(|value| !value.is_empty()),
            password.filter(|value| !value.is_empty()),
        ) else {
            return Err(UserServiceError::Validation(
                "email and password are required".to_string(),
            ));
        };

        let user = self
            .reader
            .find_by_email(email)
            .await?
            .ok_or(UserServiceError::InvalidCredentials)?;

        if !self.credentials.verify(password, &user.password_hash)? {
            return Err(UserServiceError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn list_users(
        &self,
        admin_id: Option<&str>,
    ) -> Result<Vec<UserWithPostCount>, UserServiceError> {
        self.access.require_admin(admin_id).await?;
        Ok(self.reader.list_with_post_counts().await?)
    }

    pub async fn change_role(
        &self,
        target_id: &str,
        role: Option<&str>,
        admin_id: Option<&str>,
    ) -> Result<UserRecord, UserServiceError> {
        if admin_id.is_none_or(|id| id.trim().is_empty()) {
            return Err(AccessError::MissingActor.into());
        }
        let role = role
            .and_then(UserRole::parse)
            .ok_or_else(|| UserServiceError::Validation("invalid role".to_string()))?;

        let admin = self.access.require_admin(admin_id).await?;
        let target = match parse_id(target_id) {
            Some(id) => self.reader.find_by_id(id).await?,
            None => None,
        }
        .ok_or(UserServiceError::NotFound { entity: "user" })?;

        if admin.id == target.id && role == UserRole::User {
            let admins = self.reader.count_users(Some(UserRole::Admin)).await?;
            if admins <= 1 {
                return Err(UserServiceError::Validation(
                    "the only administrator cannot be demoted".to_string(),
                ));
            }
        }

        let updated = self
            .writer
            .update_user_role(UpdateUserRoleParams {
                id: target.id,
                role,
                updated_at: self.clock.now(),
            })
            .await?;

        info!(
            target = "pulseboard::users",
            user_id = %updated.id,
            admin_id = %admin.id,
            previous = target.role.as_str(),
            role = updated.role.as_str(),
            "Role changed"
        );

        Ok(updated)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
