//! In-process repository used when no database is configured.
//!
//! State lives inside the instance; each `InMemoryRepositories::new` starts empty.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::application::repos::{
    CreatePostParams, CreateUserParams, PostsRepo, PostsWriteRepo, RepoError,
    UpdatePostContentParams, UpdatePostStatusParams, UpdateUserRoleParams, UsersRepo,
    UsersWriteRepo,
};
use crate::domain::entities::{PostRecord, PostWithAuthor, UserRecord, UserWithPostCount};
use crate::domain::types::{PostStatus, UserRole};

#[derive(Default)]
struct Store {
    users: HashMap<Uuid, UserRecord>,
    posts: HashMap<Uuid, PostRecord>,
}

impl Store {
    fn join(&self, post: &PostRecord) -> Result<PostWithAuthor, RepoError> {
        let author = self
            .users
            .get(&post.author_id)
            .cloned()
            .ok_or_else(|| RepoError::Integrity {
                message: format!("post {} references missing author", post.id),
            })?;
        Ok(PostWithAuthor {
            post: post.clone(),
            author,
        })
    }
}

#[derive(Clone, Default)]
pub struct InMemoryRepositories {
    store: Arc<RwLock<Store>>,
}

impl InMemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first, ties broken by id so ordering is stable.
fn newest_first(a: (OffsetDateTime, Uuid), b: (OffsetDateTime, Uuid)) -> std::cmp::Ordering {
    b.cmp(&a)
}

#[async_trait]
impl UsersRepo for InMemoryRepositories {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        Ok(self.store.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        let store = self.store.read().await;
        Ok(store.users.values().find(|user| user.email == email).cloned())
    }

    async fn find_conflicting(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<UserRecord>, RepoError> {
        let store = self.store.read().await;
        let by_email = store.users.values().find(|user| user.email == email);
        let by_username = || store.users.values().find(|user| user.username == username);
        Ok(by_email.or_else(by_username).cloned())
    }

    async fn list_with_post_counts(&self) -> Result<Vec<UserWithPostCount>, RepoError> {
        let store = self.store.read().await;
        let mut counts: HashMap<Uuid, u64> = HashMap::new();
        for post in store.posts.values() {
            *counts.entry(post.author_id).or_default() += 1;
        }

        let mut users: Vec<UserWithPostCount> = store
            .users
            .values()
            .map(|user| UserWithPostCount {
                post_count: counts.get(&user.id).copied().unwrap_or(0),
                user: user.clone(),
            })
            .collect();
        users.sort_by(|a, b| {
            newest_first(
                (a.user.created_at, a.user.id),
                (b.user.created_at, b.user.id),
            )
        });
        Ok(users)
    }

    async fn count_users(&self, role: Option<UserRole>) -> Result<u64, RepoError> {
        let store = self.store.read().await;
        let count = store
            .users
            .values()
            .filter(|user| role.is_none_or(|role| user.role == role))
            .count();
        Ok(count as u64)
    }

    async fn count_created_since(&self, since: OffsetDateTime) -> Result<u64, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .users
            .values()
            .filter(|user| user.created_at >= since)
            .count() as u64)
    }
}

#[async_trait]
impl UsersWriteRepo for InMemoryRepositories {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let mut store = self.store.write().await;
        for existing in store.users.values() {
            if existing.email == params.email {
                return Err(RepoError::Duplicate {
                    constraint: "users_email_key".to_string(),
                });
            }
            if existing.username == params.username {
                return Err(RepoError::Duplicate {
                    constraint: "users_username_key".to_string(),
                });
            }
        }

        let user = UserRecord {
            id: Uuid::new_v4(),
            username: params.username,
            email: params.email,
            password_hash: params.password_hash,
            avatar: params.avatar,
            role: params.role,
            created_at: params.created_at,
            updated_at: params.created_at,
        };
        store.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user_role(
        &self,
        params: UpdateUserRoleParams,
    ) -> Result<UserRecord, RepoError> {
        let mut store = self.store.write().await;
        let user = store.users.get_mut(&params.id).ok_or(RepoError::NotFound)?;
        user.role = params.role;
        user.updated_at = params.updated_at;
        Ok(user.clone())
    }
}

#[async_trait]
impl PostsRepo for InMemoryRepositories {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        Ok(self.store.read().await.posts.get(&id).cloned())
    }

    async fn find_with_author(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError> {
        let store = self.store.read().await;
        store.posts.get(&id).map(|post| store.join(post)).transpose()
    }

    async fn list_with_authors(
        &self,
        status: Option<PostStatus>,
    ) -> Result<Vec<PostWithAuthor>, RepoError> {
        let store = self.store.read().await;
        let mut posts: Vec<&PostRecord> = store
            .posts
            .values()
            .filter(|post| status.is_none_or(|status| post.status == status))
            .collect();
        posts.sort_by(|a, b| newest_first((a.created_at, a.id), (b.created_at, b.id)));
        posts.into_iter().map(|post| store.join(post)).collect()
    }

    async fn count_posts(&self, status: Option<PostStatus>) -> Result<u64, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .posts
            .values()
            .filter(|post| status.is_none_or(|status| post.status == status))
            .count() as u64)
    }

    async fn count_created_since(&self, since: OffsetDateTime) -> Result<u64, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .posts
            .values()
            .filter(|post| post.created_at >= since)
            .count() as u64)
    }

    async fn total_likes(&self) -> Result<u64, RepoError> {
        let store = self.store.read().await;
        let total: i64 = store.posts.values().map(|post| post.likes.max(0)).sum();
        Ok(total as u64)
    }
}

#[async_trait]
impl PostsWriteRepo for InMemoryRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let mut store = self.store.write().await;
        if !store.users.contains_key(&params.author_id) {
            return Err(RepoError::InvalidInput {
                message: format!("author {} does not exist", params.author_id),
            });
        }

        let post = PostRecord {
            id: Uuid::new_v4(),
            title: params.title,
            subtitle: params.subtitle,
            content: params.content,
            image_url: params.image_url,
            image_public_id: params.image_public_id,
            author_id: params.author_id,
            status: params.status,
            rejected_reason: None,
            likes: 0,
            created_at: params.created_at,
            updated_at: params.created_at,
        };
        store.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update_post_content(
        &self,
        params: UpdatePostContentParams,
    ) -> Result<PostRecord, RepoError> {
        let mut store = self.store.write().await;
        let post = store.posts.get_mut(&params.id).ok_or(RepoError::NotFound)?;
        post.title = params.title;
        post.subtitle = params.subtitle;
        post.content = params.content;
        post.image_url = params.image_url;
        post.image_public_id = params.image_public_id;
        post.updated_at = params.updated_at;
        Ok(post.clone())
    }

    async fn update_post_status(
        &self,
        params: UpdatePostStatusParams,
    ) -> Result<PostRecord, RepoError> {
        let mut store = self.store.write().await;
        let post = store.posts.get_mut(&params.id).ok_or(RepoError::NotFound)?;
        post.status = params.status;
        post.rejected_reason = params.rejected_reason;
        post.updated_at = params.updated_at;
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        store
            .posts
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn user_params(name: &str, role: UserRole, at: OffsetDateTime) -> CreateUserParams {
        CreateUserParams {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "hash".to_string(),
            avatar: None,
            role,
            created_at: at,
        }
    }

    #[tokio::test]
    async fn duplicate_email_or_username_is_rejected() {
        let repo = InMemoryRepositories::new();
        let at = datetime!(2025-09-01 12:00 UTC);
        repo.create_user(user_params("ana", UserRole::Admin, at))
            .await
            .unwrap();

        let err = repo
            .create_user(user_params("ana", UserRole::User, at))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate { .. }));

        let conflict = repo
            .find_conflicting("other@example.com", "ana")
            .await
            .unwrap();
        assert!(conflict.is_some());
    }

    #[tokio::test]
    async fn posts_list_newest_first_with_status_filter() {
        let repo = InMemoryRepositories::new();
        let author = repo
            .create_user(user_params(
                "bruno",
                UserRole::User,
                datetime!(2025-09-01 08:00 UTC),
            ))
            .await
            .unwrap();

        for (hour, status) in [(9, PostStatus::Pending), (10, PostStatus::Approved)] {
            repo.create_post(CreatePostParams {
                title: format!("post {hour}"),
                subtitle: None,
                content: "body".into(),
                image_url: None,
                image_public_id: None,
                author_id: author.id,
                status,
                created_at: datetime!(2025-09-01 00:00 UTC) + time::Duration::hours(hour),
            })
            .await
            .unwrap();
        }

        let all = repo.list_with_authors(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].post.title, "post 10");
        assert_eq!(all[0].author.username, "bruno");

        let pending = repo
            .list_with_authors(Some(PostStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(repo.count_posts(Some(PostStatus::Approved)).await.unwrap(), 1);

        let counts = repo.list_with_post_counts().await.unwrap();
        assert_eq!(counts[0].post_count, 2);
    }

    #[tokio::test]
    async fn separate_instances_do_not_share_state() {
        let first = InMemoryRepositories::new();
        let second = InMemoryRepositories::new();
        first
            .create_user(user_params("carla", UserRole::User, OffsetDateTime::UNIX_EPOCH))
            .await
            .unwrap();
        assert_eq!(second.count_users(None).await.unwrap(), 0);
        assert_eq!(first.count_users(None).await.unwrap(), 1);
    }
}
