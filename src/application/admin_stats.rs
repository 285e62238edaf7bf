//! Dashboard counters for administrators.

use std::sync::Arc;

use chrono_tz::Tz;
use serde::Serialize;

use crate::application::access::{AccessControl, AccessError};
use crate::application::clock::Clock;
use crate::application::repos::{PostsRepo, RepoError, UsersRepo};
use crate::domain::types::{PostStatus, UserRole};
use crate::util::timezone::{localized_date, start_of_local_day};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_posts: u64,
    pub pending_posts: u64,
    pub approved_posts: u64,
    pub rejected_posts: u64,
    pub total_likes: u64,
    pub admin_users: u64,
    pub regular_users: u64,
    pub posts_today: u64,
    pub users_today: u64,
}

#[derive(Clone)]
pub struct AdminStatsService {
    users: Arc<dyn UsersRepo>,
    posts: Arc<dyn PostsRepo>,
    access: AccessControl,
    clock: Arc<dyn Clock>,
    timezone: Tz,
}

impl AdminStatsService {
    pub fn new(
        users: Arc<dyn UsersRepo>,
        posts: Arc<dyn PostsRepo>,
        access: AccessControl,
        clock: Arc<dyn Clock>,
        timezone: Tz,
    ) -> Self {
        Self {
            users,
            posts,
            access,
            clock,
            timezone,
        }
    }

    pub async fn collect(&self, admin_id: Option<&str>) -> Result<AdminStats, AccessError> {
        self.access.require_admin(admin_id).await?;
        Ok(self.counts().await?)
    }

    async fn counts(&self) -> Result<AdminStats, RepoError> {
        let today = localized_date(self.clock.now(), self.timezone);
        let since = start_of_local_day(today, self.timezone);

        Ok(AdminStats {
            total_users: self.users.count_users(None).await?,
            total_posts: self.posts.count_posts(None).await?,
            pending_posts: self.posts.count_posts(Some(PostStatus::Pending)).await?,
            approved_posts: self.posts.count_posts(Some(PostStatus::Approved)).await?,
            rejected_posts: self.posts.count_posts(Some(PostStatus::Rejected)).await?,
            total_likes: self.posts.total_likes().await?,
            admin_users: self.users.count_users(Some(UserRole::Admin)).await?,
            regular_users: self.users.count_users(Some(UserRole::User)).await?,
            posts_today: self.posts.count_created_since(since).await?,
            users_today: self.users.count_created_since(since).await?,
        })
    }
}
