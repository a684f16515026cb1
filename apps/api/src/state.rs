use std::sync::Arc;

use crate::config::Config;
use crate::errors::{AppError, MODEL_NOT_LOADED, RESUME_DEPS_NOT_LOADED};
use crate::keywords::KeywordExtractor;
use crate::prediction::predictor::RolePredictor;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Everything here is populated once at startup and read-only afterwards.
/// A `None` means loading failed and the service answers 503.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub predictor: Option<Arc<RolePredictor>>,
    /// Only present for the resume variant with an API key configured.
    pub keywords: Option<Arc<dyn KeywordExtractor>>,
}

impl AppState {
    pub fn require_predictor(&self) -> Result<Arc<RolePredictor>, AppError> {
        self.predictor
            .clone()
            .ok_or_else(|| AppError::ServiceUnavailable(MODEL_NOT_LOADED.to_string()))
    }

    /// The resume endpoint needs both the model and the keyword extractor and
    /// reports either one missing with the same message.
    pub fn require_resume_pipeline(
        &self,
    ) -> Result<(Arc<RolePredictor>, Arc<dyn KeywordExtractor>), AppError> {
        match (&self.predictor, &self.keywords) {
            (Some(predictor), Some(keywords)) => Ok((predictor.clone(), keywords.clone())),
            _ => Err(AppError::ServiceUnavailable(
                RESUME_DEPS_NOT_LOADED.to_string(),
            )),
        }
    }
}
