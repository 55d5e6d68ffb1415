// Protected handlers: mounted behind jwt_auth_middleware and
// validate_user_middleware, which supply `ValidatedUser`.

pub mod trails;
pub mod users;
