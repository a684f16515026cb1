mod config;
mod errors;
mod keywords;
mod llm_client;
mod model;
mod prediction;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::keywords::{GeminiKeywordExtractor, KeywordExtractor};
use crate::llm_client::LlmClient;
use crate::prediction::predictor::RolePredictor;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration errors (bad PORT, unknown variant) abort startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting {} v{} (variant: {})",
        config.variant.title(),
        env!("CARGO_PKG_VERSION"),
        config.variant
    );

    let predictor = load_predictor(&config);
    let keywords = build_keyword_extractor(&config);

    let state = AppState {
        config: config.clone(),
        predictor,
        keywords,
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Loads the model artifacts. Failure leaves the service up but answering 503.
fn load_predictor(config: &Config) -> Option<Arc<RolePredictor>> {
    match RolePredictor::load(config.variant, &config.model_dir) {
        Ok(predictor) => {
            let info = predictor.info();
            info!(
                "Model assets loaded: {} ({} features, {} classes)",
                info.model_file, info.n_features, info.n_classes
            );
            Some(Arc::new(predictor))
        }
        Err(e) => {
            error!("CRITICAL: model could not be loaded at startup: {e}");
            None
        }
    }
}

fn build_keyword_extractor(config: &Config) -> Option<Arc<dyn KeywordExtractor>> {
    if !config.variant.needs_keyword_extraction() {
        return None;
    }

    let Some(api_key) = config.google_api_key.clone() else {
        warn!("GOOGLE_API_KEY is not set; /api/process_resume will answer 503");
        return None;
    };

    match LlmClient::new(
        api_key,
        config.gemini_model.clone(),
        config.gemini_base_url.clone(),
    ) {
        Ok(llm) => {
            info!("Gemini client initialized (model: {})", llm.model());
            Some(Arc::new(GeminiKeywordExtractor::new(llm)))
        }
        Err(e) => {
            error!("CRITICAL: failed to configure Gemini client: {e}");
            None
        }
    }
}
