pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::config::Variant;
use crate::prediction::handlers;
use crate::state::AppState;

/// Builds the router for the configured variant. Each variant exposes exactly
/// one prediction endpoint.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler));

    let router = match state.config.variant {
        Variant::Forest | Variant::Boost => {
            router.route("/api/predict", post(handlers::handle_predict))
        }
        Variant::Resume => router.route(
            "/api/process_resume",
            post(handlers::handle_process_resume),
        ),
    };

    router.with_state(state)
}
