mod middleware;
mod public;

pub mod api;

pub use api::{ApiState, build_api_router};
pub use public::HttpState;

use axum::Router;
use axum::extract::FromRef;
use axum::middleware as axum_middleware;
use axum::routing::get;

use middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct RouterState {
    pub http: HttpState,
    pub api: ApiState,
}

impl FromRef<RouterState> for HttpState {
    fn from_ref(state: &RouterState) -> Self {
        state.http.clone()
    }
}

impl FromRef<RouterState> for ApiState {
    fn from_ref(state: &RouterState) -> Self {
        state.api.clone()
    }
}

/// Full application router: API, health probe and locally stored images.
pub fn build_router(state: RouterState, max_image_bytes: u64) -> Router {
    Router::new()
        .route("/health", get(public::health))
        .route("/uploads/{*path}", get(public::serve_upload))
        .merge(build_api_router(max_image_bytes))
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
