use axum::{extract::State, Json};

use crate::api::{TokenForm, ValidForm};
use crate::error::ApiResult;
use crate::services::{AuthService, IssuedToken};
use crate::state::AppState;

/// POST /token - exchange provider-verified credentials for a bearer token
///
/// Form fields follow the OAuth2 password flow: `username` (the email) and
/// `password`. Responds with `{access_token, token_type, user}`.
pub async fn issue(
    State(state): State<AppState>,
    ValidForm(form): ValidForm<TokenForm>,
) -> ApiResult<Json<IssuedToken>> {
    form.validate()?;

    let issued = AuthService::new(
        state.repo.as_ref(),
        state.verifier.as_ref(),
        &state.config.security,
    )
    .issue_token(&form.username, &form.password)
    .await?;

    Ok(Json(issued))
}
