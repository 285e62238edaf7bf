//! Actor resolution shared by every moderation and administration operation.
//!
//! Caller-supplied identifiers are only ever used to look the actor up again in the user
//! store; roles are taken from the stored record.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::application::repos::{RepoError, UsersRepo};
use crate::domain::entities::UserRecord;
use crate::domain::moderation::ensure_admin;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("acting user id is required")]
    MissingActor,
    #[error("acting user not found")]
    UnknownActor,
    #[error("administrator role required")]
    NotAdmin,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct AccessControl {
    users: Arc<dyn UsersRepo>,
}

impl AccessControl {
    pub fn new(users: Arc<dyn UsersRepo>) -> Self {
        Self { users }
    }

    pub async fn require_actor(&self, actor_id: Option<&str>) -> Result<UserRecord, AccessError> {
        let raw = actor_id
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(AccessError::MissingActor)?;
        let Some(id) = parse_id(raw) else {
            return Err(AccessError::UnknownActor);
        };
        self.users
            .find_by_id(id)
            .await?
            .ok_or(AccessError::UnknownActor)
    }

    pub async fn require_admin(&self, actor_id: Option<&str>) -> Result<UserRecord, AccessError> {
        let actor = self.require_actor(actor_id).await?;
        ensure_admin(&actor).map_err(|_| AccessError::NotAdmin)?;
        Ok(actor)
    }
}

/// Identifiers that do not parse cannot name a stored record.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}
