pub mod auth;
pub mod dashboard;
pub mod health;
pub mod subscription;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::rate_limit::{rps_middleware, RateLimiter};
use crate::AppState;

pub fn router(state: AppState) -> Router {
    let credential_api = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .layer(axum::middleware::from_fn_with_state(
            RateLimiter::new(state.config.auth_rps, state.config.trust_forwarded_for),
            rps_middleware,
        ));

    let api = Router::new()
        .route("/health", get(health::health))
        .route("/", get(dashboard::index))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/dashboard", get(dashboard::dashboard))
        .route(
            "/api/subscription",
            get(subscription::get_subscription).post(subscription::subscribe),
        )
        .route("/api/tests", get(tests::list_tests))
        .route("/api/tests/:test_id", get(tests::get_test))
        .route("/api/tests/:test_id/submit", post(tests::submit_test))
        .route(
            "/api/tests/:test_id/results/:result_id",
            get(tests::view_result),
        );

    api.merge(credential_api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
