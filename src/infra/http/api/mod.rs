pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};

use crate::infra::http::RouterState;

/// Multipart bodies may carry one image plus a handful of text fields.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_api_router(max_image_bytes: u64) -> Router<RouterState> {
    let body_limit = usize::try_from(max_image_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(FORM_OVERHEAD_BYTES);

    Router::new()
        .route("/api/progress", get(handlers::get_progress))
        .route("/api/milestones", get(handlers::get_milestones))
        .route("/api/stats", get(handlers::get_stats))
        .route(
            "/api/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route(
            "/api/posts/{id}",
            get(handlers::get_post)
                .put(handlers::edit_post)
                .delete(handlers::delete_post),
        )
        .route("/api/posts/{id}/approve", put(handlers::approve_post))
        .route("/api/posts/{id}/reject", put(handlers::reject_post))
        .route("/api/upload", post(handlers::upload_image))
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/users", get(handlers::list_users))
        .route("/api/users/{id}/role", put(handlers::change_role))
        .route("/api/admin/stats", get(handlers::admin_stats))
        .layer(DefaultBodyLimit::max(body_limit))
}
