use axum::{Extension, Json};

use crate::database::models::User;
use crate::middleware::ValidatedUser;

/// GET /users/me - the authenticated caller
pub async fn me(Extension(ValidatedUser(user)): Extension<ValidatedUser>) -> Json<User> {
    Json(user)
}
