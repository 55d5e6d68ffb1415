use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};

use crate::api::{TrailPayload, ValidJson, ValidPath};
use crate::database::models::{NewTrail, Trail};
use crate::error::{ApiError, ApiResult};
use crate::middleware::ValidatedUser;
use crate::state::AppState;

/// POST /api/trails - create a trail owned by the caller
///
/// TrailID, DateCreated (today, UTC) and CreatedBy are assigned server-side.
pub async fn create(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
    ValidJson(payload): ValidJson<TrailPayload>,
) -> ApiResult<(StatusCode, Json<Trail>)> {
    let changes = payload.validate()?;

    let new_trail = NewTrail {
        trail_name: changes.trail_name,
        description: changes.description,
        date_created: chrono::Utc::now().date_naive(),
        created_by: user.id,
    };

    let trail_id = state.repo.create_trail(new_trail).await?;
    let trail = state.repo.get_trail(trail_id).await?;

    tracing::info!("User {} created trail {}", user.id, trail.trail_id);
    Ok((StatusCode::CREATED, Json(trail)))
}

/// PUT /api/trails/:trail_id - replace name and description
pub async fn update(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
    ValidPath(trail_id): ValidPath<i32>,
    ValidJson(payload): ValidJson<TrailPayload>,
) -> ApiResult<Json<Trail>> {
    let changes = payload.validate()?;

    let existing = state.repo.get_trail(trail_id).await?;
    ensure_owner(&existing, user.id, "update")?;

    state.repo.update_trail(trail_id, changes).await?;
    let trail = state.repo.get_trail(trail_id).await?;

    tracing::info!("User {} updated trail {}", user.id, trail_id);
    Ok(Json(trail))
}

/// DELETE /api/trails/:trail_id - remove a trail and its user associations
pub async fn delete(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
    ValidPath(trail_id): ValidPath<i32>,
) -> ApiResult<Json<Value>> {
    let existing = state.repo.get_trail(trail_id).await?;
    ensure_owner(&existing, user.id, "delete")?;

    state.repo.delete_trail(trail_id).await?;

    tracing::info!("User {} deleted trail {}", user.id, trail_id);
    Ok(Json(json!({ "message": "Trail deleted successfully" })))
}

fn ensure_owner(trail: &Trail, user_id: i32, action: &str) -> Result<(), ApiError> {
    if trail.created_by != user_id {
        tracing::warn!(
            "User {} tried to {} trail {} owned by {}",
            user_id,
            action,
            trail.trail_id,
            trail.created_by
        );
        return Err(ApiError::forbidden(format!(
            "Not authorized to {} this trail",
            action
        )));
    }
    Ok(())
}
