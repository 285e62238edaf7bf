//! Goal progress handlers.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderValue, header::CACHE_CONTROL};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::milestones::Milestone;
use crate::infra::http::api::state::ApiState;

const DAILY_CACHE: &str = "public, s-maxage=3600, stale-while-revalidate=86400";
const STATS_CACHE: &str = "public, s-maxage=1800, stale-while-revalidate=3600";

#[derive(Debug, Serialize)]
struct MilestonesResponse {
    milestones: Vec<Milestone>,
}

fn with_cache(policy: &'static str, body: impl Serialize) -> Response {
    let mut response = Json(body).into_response();
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static(policy));
    response
}

pub async fn get_progress(State(state): State<ApiState>) -> Response {
    with_cache(DAILY_CACHE, state.goal.progress())
}

pub async fn get_milestones(State(state): State<ApiState>) -> Response {
    with_cache(
        DAILY_CACHE,
        MilestonesResponse {
            milestones: state.goal.milestones(),
        },
    )
}

pub async fn get_stats(State(state): State<ApiState>) -> Response {
    with_cache(STATS_CACHE, state.goal.stats())
}
