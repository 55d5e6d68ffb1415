use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, validate_user_middleware};
use crate::state::AppState;

/// Build the full application router over `state`.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::root::root))
        .route("/health", get(public::root::health))
        .route("/token", post(public::token::issue))
        .route("/api/trails", get(public::trails::list))
        .route("/api/trails/:trail_id", get(public::trails::get))
        .route("/api/trails/:trail_id/details", get(public::trails::details))
        .route("/api/trails/:trail_id/log", get(public::trails::log))
        .route("/api/users/:user_id/trails", get(public::users::trails))
}

/// Routes that need a valid bearer token for a user that still exists.
/// Authentication runs as a route layer, so it rejects a request before
/// any body or path extraction happens.
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/trails", post(protected::trails::create))
        .route(
            "/api/trails/:trail_id",
            put(protected::trails::update).delete(protected::trails::delete),
        )
        .route("/users/me", get(protected::users::me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            validate_user_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    if security.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}
