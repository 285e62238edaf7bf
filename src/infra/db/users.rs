use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{
        CreateUserParams, RepoError, UpdateUserRoleParams, UsersRepo, UsersWriteRepo,
    },
    domain::{
        entities::{UserRecord, UserWithPostCount},
        types::UserRole,
    },
};

use super::{PostgresRepositories, map_sqlx_error};

const USER_COLUMNS: &str =
    "u.id, u.username, u.email, u.password_hash, u.avatar, u.role, u.created_at, u.updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    avatar: Option<String>,
    role: UserRole,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            avatar: row.avatar,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserCountRow {
    #[sqlx(flatten)]
    user: UserRow,
    post_count: i64,
}

impl PostgresRepositories {
    async fn fetch_user_where(
        &self,
        column: &'static str,
        value: &str,
    ) -> Result<Option<UserRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users u"));
        qb.push(" WHERE u.");
        qb.push(column);
        qb.push(" = ");
        qb.push_bind(value.to_string());

        let row = qb
            .build_query_as::<UserRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(UserRecord::from))
    }
}

#[async_trait]
impl UsersRepo for PostgresRepositories {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserRecord::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        self.fetch_user_where("email", email).await
    }

    async fn find_conflicting(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<UserRecord>, RepoError> {
        // Email matches sort first so callers can report the more specific conflict.
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users u \
             WHERE u.email = $1 OR u.username = $2 \
             ORDER BY (u.email = $1) DESC \
             LIMIT 1"
        ))
        .bind(email)
        .bind(username)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserRecord::from))
    }

    async fn list_with_post_counts(&self) -> Result<Vec<UserWithPostCount>, RepoError> {
        let rows = sqlx::query_as::<_, UserCountRow>(&format!(
            "SELECT {USER_COLUMNS}, \
                    (SELECT COUNT(*) FROM posts p WHERE p.author_id = u.id) AS post_count \
             FROM users u \
             ORDER BY u.created_at DESC, u.id DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|row| {
                Ok(UserWithPostCount {
                    post_count: Self::convert_count(row.post_count)?,
                    user: row.user.into(),
                })
            })
            .collect()
    }

    async fn count_users(&self, role: Option<UserRole>) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        if let Some(role) = role {
            qb.push(" WHERE role = ");
            qb.push_bind(role);
        }

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn count_created_since(&self, since: OffsetDateTime) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE created_at >= $1")
            .bind(since)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }
}

#[async_trait]
impl UsersWriteRepo for PostgresRepositories {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users AS u (id, username, email, password_hash, avatar, role, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7) \
             RETURNING u.id, u.username, u.email, u.password_hash, u.avatar, u.role, u.created_at, u.updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(params.username)
        .bind(params.email)
        .bind(params.password_hash)
        .bind(params.avatar)
        .bind(params.role)
        .bind(params.created_at)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_user_role(
        &self,
        params: UpdateUserRoleParams,
    ) -> Result<UserRecord, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users u SET role = $2, updated_at = $3 WHERE u.id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(params.id)
        .bind(params.role)
        .bind(params.updated_at)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }
}
