use axum::{extract::State, Json};

use crate::api::ValidPath;
use crate::database::models::{Trail, TrailDetails, TrailLogEntry};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/trails - all trails
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Trail>>> {
    Ok(Json(state.repo.list_trails().await?))
}

/// GET /api/trails/:trail_id - single trail or 404
pub async fn get(
    State(state): State<AppState>,
    ValidPath(trail_id): ValidPath<i32>,
) -> ApiResult<Json<Trail>> {
    Ok(Json(state.repo.get_trail(trail_id).await?))
}

/// GET /api/trails/:trail_id/details - trail with its creator's name
pub async fn details(
    State(state): State<AppState>,
    ValidPath(trail_id): ValidPath<i32>,
) -> ApiResult<Json<TrailDetails>> {
    Ok(Json(state.repo.trail_details(trail_id).await?))
}

/// GET /api/trails/:trail_id/log - audit entries, oldest first
pub async fn log(
    State(state): State<AppState>,
    ValidPath(trail_id): ValidPath<i32>,
) -> ApiResult<Json<Vec<TrailLogEntry>>> {
    Ok(Json(state.repo.trail_log(trail_id).await?))
}
