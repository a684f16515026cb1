use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /
/// Liveness message naming the running service.
pub async fn root_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": format!("{} is running.", state.config.variant.title())
    }))
}

/// GET /health
/// Reports version, variant, and what was loaded at startup.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let model = state.predictor.as_ref().map(|p| p.info().clone());
    let keywords = state.keywords.as_ref().map(|k| k.backend());
    let ready = model.is_some()
        && (!state.config.variant.needs_keyword_extraction() || keywords.is_some());
    let status = if ready { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME"),
        "variant": state.config.variant.as_str(),
        "model_loaded": model.is_some(),
        "model": model,
        "keyword_extractor": keywords,
    }))
}
