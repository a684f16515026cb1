use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Which of the three services this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Skills list in, random forest prediction out.
    Forest,
    /// Skills list in, gradient boosted prediction out.
    Boost,
    /// Resume text in, Gemini keyword extraction, gradient boosted prediction out.
    Resume,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Forest => "forest",
            Variant::Boost => "boost",
            Variant::Resume => "resume",
        }
    }

    /// Human-readable service name, reported by the root status endpoint.
    pub fn title(&self) -> &'static str {
        match self {
            Variant::Forest => "Job Role Prediction API",
            Variant::Boost => "XGBoost Job Role Prediction API",
            Variant::Resume => "Secure Job Role Prediction API",
        }
    }

    pub fn default_model_dir(&self) -> PathBuf {
        let leaf = match self {
            Variant::Forest => "saved_model",
            Variant::Boost => "saved_model_xgboost",
            Variant::Resume => "saved_model_xgboost_gpu",
        };
        PathBuf::from("model_training").join(leaf)
    }

    pub fn needs_keyword_extraction(&self) -> bool {
        matches!(self, Variant::Resume)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forest" | "rforest" | "random_forest" => Ok(Variant::Forest),
            "boost" | "xgboost" => Ok(Variant::Boost),
            "resume" => Ok(Variant::Resume),
            other => bail!("Unknown SERVICE_VARIANT '{other}' (expected forest, boost or resume)"),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub variant: Variant,
    pub model_dir: PathBuf,
    pub port: u16,
    /// Optional: only the resume variant needs it, and it degrades to 503 without it.
    pub google_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let variant: Variant = std::env::var("SERVICE_VARIANT")
            .unwrap_or_else(|_| "forest".to_string())
            .parse()?;

        Ok(Config {
            variant,
            model_dir: std::env::var("MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| variant.default_model_dir()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            google_api_key: optional_env("GOOGLE_API_KEY"),
            gemini_model: optional_env("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: optional_env("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Treats unset and blank variables the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_parses_aliases() {
        assert_eq!("forest".parse::<Variant>().unwrap(), Variant::Forest);
        assert_eq!("XGBoost".parse::<Variant>().unwrap(), Variant::Boost);
        assert_eq!(" resume ".parse::<Variant>().unwrap(), Variant::Resume);
    }

    #[test]
    fn test_variant_rejects_unknown() {
        assert!("svm".parse::<Variant>().is_err());
    }

    #[test]
    fn test_default_model_dirs_differ_per_variant() {
        assert_eq!(
            Variant::Forest.default_model_dir(),
            PathBuf::from("model_training/saved_model")
        );
        assert_eq!(
            Variant::Resume.default_model_dir(),
            PathBuf::from("model_training/saved_model_xgboost_gpu")
        );
    }

    #[test]
    fn test_only_resume_needs_keywords() {
        assert!(Variant::Resume.needs_keyword_extraction());
        assert!(!Variant::Forest.needs_keyword_extraction());
        assert!(!Variant::Boost.needs_keyword_extraction());
    }
}
