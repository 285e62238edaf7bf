use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use pulseboard_api_types::AdminStatsResponse;

use super::{AdminQuery, query_params};
use crate::infra::http::api::error::{ApiError, access_to_api};
use crate::infra::http::api::state::ApiState;

pub async fn admin_stats(
    State(state): State<ApiState>,
    query: Result<Query<AdminQuery>, QueryRejection>,
) -> Result<Json<AdminStatsResponse>, ApiError> {
    let query = query_params(query)?;
    let stats = state
        .admin_stats
        .collect(query.admin_id.as_deref())
        .await
        .map_err(access_to_api)?;

    Ok(Json(stats.into()))
}
