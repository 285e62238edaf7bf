//! Conversions from stored records to wire views.

use pulseboard_api_types::{AdminStatsResponse, AuthorSummary, PostView, UserListEntry, UserView};

use crate::application::admin_stats::AdminStats;
use crate::domain::entities::{PostRecord, PostWithAuthor, UserRecord, UserWithPostCount};

pub fn user_view(user: &UserRecord) -> UserView {
    UserView {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        avatar: user.avatar.clone(),
        role: user.role,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

pub fn user_list_entry(entry: &UserWithPostCount) -> UserListEntry {
    UserListEntry {
        user: user_view(&entry.user),
        post_count: entry.post_count,
    }
}

pub fn author_summary(user: &UserRecord) -> AuthorSummary {
    AuthorSummary {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        avatar: user.avatar.clone(),
        role: user.role,
    }
}

pub fn post_view(post: &PostRecord, author: &UserRecord) -> PostView {
    PostView {
        id: post.id,
        title: post.title.clone(),
        subtitle: post.subtitle.clone(),
        content: post.content.clone(),
        image_url: post.image_url.clone(),
        image_public_id: post.image_public_id.clone(),
        author_id: post.author_id,
        status: post.status,
        rejected_reason: post.rejected_reason.clone(),
        likes: post.likes,
        created_at: post.created_at,
        updated_at: post.updated_at,
        author: author_summary(author),
    }
}

pub fn post_with_author_view(entry: &PostWithAuthor) -> PostView {
    post_view(&entry.post, &entry.author)
}

impl From<AdminStats> for AdminStatsResponse {
    fn from(stats: AdminStats) -> Self {
        Self {
            total_users: stats.total_users,
            total_posts: stats.total_posts,
            pending_posts: stats.pending_posts,
            approved_posts: stats.approved_posts,
            rejected_posts: stats.rejected_posts,
            total_likes: stats.total_likes,
            admin_users: stats.admin_users,
            regular_users: stats.regular_users,
            posts_today: stats.posts_today,
            users_today: stats.users_today,
        }
    }
}
