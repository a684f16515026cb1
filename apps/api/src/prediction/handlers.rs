//! Axum route handlers for the prediction endpoints.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::prediction::predictor::{PredictionResponse, RolePredictor};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SkillRequest {
    pub skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResumeRequest {
    pub resume_text: String,
}

/// POST /api/predict
pub async fn handle_predict(
    State(state): State<AppState>,
    Json(req): Json<SkillRequest>,
) -> Result<Json<PredictionResponse>, AppError> {
    let predictor = state.require_predictor()?;
    let response = run_prediction(predictor, req.skills).await?;
    Ok(Json(response))
}

/// POST /api/process_resume
pub async fn handle_process_resume(
    State(state): State<AppState>,
    Json(req): Json<ResumeRequest>,
) -> Result<Json<PredictionResponse>, AppError> {
    let (predictor, extractor) = state.require_resume_pipeline()?;

    if req.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text must not be empty".to_string()));
    }

    let keywords = extractor.extract(&req.resume_text).await?;
    info!("Extracted {} keyword(s): {:?}", keywords.len(), keywords);

    let mut response = run_prediction(predictor, keywords.clone()).await?;
    response.extracted_keywords = Some(keywords);
    Ok(Json(response))
}

/// Inference is CPU-bound, so it runs off the async workers.
async fn run_prediction(
    predictor: Arc<RolePredictor>,
    skills: Vec<String>,
) -> Result<PredictionResponse, AppError> {
    let response = tokio::task::spawn_blocking(move || predictor.predict(skills.as_slice()))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("prediction task failed: {e}")))??;
    Ok(response)
}
