use axum::{extract::State, Json};

use crate::api::ValidPath;
use crate::database::models::Trail;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/users/:user_id/trails - trails associated with a user
pub async fn trails(
    State(state): State<AppState>,
    ValidPath(user_id): ValidPath<i32>,
) -> ApiResult<Json<Vec<Trail>>> {
    if state.repo.find_user(user_id).await?.is_none() {
        return Err(ApiError::not_found(format!("User {} not found", user_id)));
    }

    Ok(Json(state.repo.list_user_trails(user_id).await?))
}
