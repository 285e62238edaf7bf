use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{
        CreatePostParams, PostsRepo, PostsWriteRepo, RepoError, UpdatePostContentParams,
        UpdatePostStatusParams,
    },
    domain::{
        entities::{PostRecord, PostWithAuthor, UserRecord},
        types::{PostStatus, UserRole},
    },
};

use super::{PostgresRepositories, map_sqlx_error};

const POST_COLUMNS: &str = "p.id, p.title, p.subtitle, p.content, p.image_url, p.image_public_id, \
     p.author_id, p.status, p.rejected_reason, p.likes, p.created_at, p.updated_at";

const AUTHOR_COLUMNS: &str = "a.username AS author_username, a.email AS author_email, \
     a.password_hash AS author_password_hash, a.avatar AS author_avatar, a.role AS author_role, \
     a.created_at AS author_created_at, a.updated_at AS author_updated_at";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    title: String,
    subtitle: Option<String>,
    content: String,
    image_url: Option<String>,
    image_public_id: Option<String>,
    author_id: Uuid,
    status: PostStatus,
    rejected_reason: Option<String>,
    likes: i64,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            subtitle: row.subtitle,
            content: row.content,
            image_url: row.image_url,
            image_public_id: row.image_public_id,
            author_id: row.author_id,
            status: row.status,
            rejected_reason: row.rejected_reason,
            likes: row.likes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PostAuthorRow {
    #[sqlx(flatten)]
    post: PostRow,
    author_username: String,
    author_email: String,
    author_password_hash: String,
    author_avatar: Option<String>,
    author_role: UserRole,
    author_created_at: OffsetDateTime,
    author_updated_at: OffsetDateTime,
}

impl From<PostAuthorRow> for PostWithAuthor {
    fn from(row: PostAuthorRow) -> Self {
        let author = UserRecord {
            id: row.post.author_id,
            username: row.author_username,
            email: row.author_email,
            password_hash: row.author_password_hash,
            avatar: row.author_avatar,
            role: row.author_role,
            created_at: row.author_created_at,
            updated_at: row.author_updated_at,
        };
        Self {
            post: row.post.into(),
            author,
        }
    }
}

fn joined_select() -> QueryBuilder<'static, Postgres> {
    QueryBuilder::new(format!(
        "SELECT {POST_COLUMNS}, {AUTHOR_COLUMNS} FROM posts p \
         INNER JOIN users a ON a.id = p.author_id"
    ))
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }

    async fn find_with_author(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError> {
        let mut qb = joined_select();
        qb.push(" WHERE p.id = ");
        qb.push_bind(id);

        let row = qb
            .build_query_as::<PostAuthorRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostWithAuthor::from))
    }

    async fn list_with_authors(
        &self,
        status: Option<PostStatus>,
    ) -> Result<Vec<PostWithAuthor>, RepoError> {
        let mut qb = joined_select();
        if let Some(status) = status {
            qb.push(" WHERE p.status = ");
            qb.push_bind(status);
        }
        qb.push(" ORDER BY p.created_at DESC, p.id DESC");

        let rows = qb
            .build_query_as::<PostAuthorRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostWithAuthor::from).collect())
    }

    async fn count_posts(&self, status: Option<PostStatus>) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts");
        if let Some(status) = status {
            qb.push(" WHERE status = ");
            qb.push_bind(status);
        }

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn count_created_since(&self, since: OffsetDateTime) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE created_at >= $1")
            .bind(since)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn total_likes(&self) -> Result<u64, RepoError> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(likes), 0)::BIGINT FROM posts")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(total)
    }
}

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "INSERT INTO posts AS p (id, title, subtitle, content, image_url, image_public_id, \
                                    author_id, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9) \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(params.title)
        .bind(params.subtitle)
        .bind(params.content)
        .bind(params.image_url)
        .bind(params.image_public_id)
        .bind(params.author_id)
        .bind(params.status)
        .bind(params.created_at)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_post_content(
        &self,
        params: UpdatePostContentParams,
    ) -> Result<PostRecord, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "UPDATE posts p SET title = $2, subtitle = $3, content = $4, image_url = $5, \
                                image_public_id = $6, updated_at = $7 \
             WHERE p.id = $1 \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(params.id)
        .bind(params.title)
        .bind(params.subtitle)
        .bind(params.content)
        .bind(params.image_url)
        .bind(params.image_public_id)
        .bind(params.updated_at)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_post_status(
        &self,
        params: UpdatePostStatusParams,
    ) -> Result<PostRecord, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "UPDATE posts p SET status = $2, rejected_reason = $3, updated_at = $4 \
             WHERE p.id = $1 \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(params.id)
        .bind(params.status)
        .bind(params.rejected_reason)
        .bind(params.updated_at)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
