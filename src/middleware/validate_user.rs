use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;
use super::auth::AuthUser;

/// User row confirmed to exist for the token's `user_id`
#[derive(Clone, Debug)]
pub struct ValidatedUser(pub User);

/// Middleware that checks the token's user still exists in `cw1.users` and
/// that the email in the token matches the stored one. Runs after
/// `jwt_auth_middleware`.
pub async fn validate_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before user validation"))?;

    let user = state
        .repo
        .find_user(auth_user.user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(
                "User validation failed: user {} ({}) not found",
                auth_user.user_id,
                auth_user.email
            );
            ApiError::unauthorized("Could not validate credentials")
        })?;

    if !user.email.eq_ignore_ascii_case(&auth_user.email) {
        tracing::warn!(
            "User validation failed: token email '{}' doesn't match user {}",
            auth_user.email,
            user.id
        );
        return Err(ApiError::unauthorized("Could not validate credentials"));
    }

    tracing::debug!("User validation successful: {} ({})", user.name, user.email);

    request.extensions_mut().insert(ValidatedUser(user));

    Ok(next.run(request).await)
}
