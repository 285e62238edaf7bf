//! Moderation rules for the post lifecycle.

use crate::domain::entities::UserRecord;
use crate::domain::error::DomainError;
use crate::domain::types::{PostStatus, UserRole};

/// Status assigned to a freshly created post, from the author's stored role.
pub fn initial_status(author_role: UserRole) -> PostStatus {
    match author_role {
        UserRole::Admin => PostStatus::Approved,
        UserRole::User => PostStatus::Pending,
    }
}

/// Whether `actor` may edit or delete a post written by `author`.
///
/// Authors may always touch their own posts. Admins may touch posts written by regular users
/// but never another admin's.
pub fn can_modify(actor: &UserRecord, author: &UserRecord) -> bool {
    actor.id == author.id || (actor.is_admin() && !author.is_admin())
}

pub fn ensure_can_modify(actor: &UserRecord, author: &UserRecord) -> Result<(), DomainError> {
    if can_modify(actor, author) {
        Ok(())
    } else {
        Err(DomainError::forbidden(
            "only the author or an administrator may change this post",
        ))
    }
}

pub fn ensure_admin(actor: &UserRecord) -> Result<(), DomainError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(DomainError::forbidden("administrator role required"))
    }
}

/// Trimmed rejection reason; blank reasons are refused.
pub fn normalize_reject_reason(reason: Option<&str>) -> Result<String, DomainError> {
    match reason.map(str::trim) {
        Some(reason) if !reason.is_empty() => Ok(reason.to_string()),
        _ => Err(DomainError::validation("a rejection reason is required")),
    }
}
