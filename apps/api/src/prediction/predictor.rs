//! Role predictor — vocabulary, classifier, and class labels loaded together
//! at startup and shared read-only by every request.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Variant;
use crate::model::artifacts::{
    find_artifact, read_feature_list, read_label_encoder, read_text, ArtifactPattern, Pick,
};
use crate::model::{Classifier, GradientBoosted, ModelError, RandomForest};
use crate::prediction::features::FeatureVocabulary;
use crate::prediction::ranking::{format_confidence, top_k, TOP_K};

const FOREST_MODEL: ArtifactPattern = ArtifactPattern {
    kind: "random forest model",
    prefix: "job_role_predictor",
    extension: Some("json"),
};
const FOREST_FEATURES: ArtifactPattern = ArtifactPattern {
    kind: "feature list",
    prefix: "feature_list",
    extension: Some("json"),
};
const XGB_MODEL: ArtifactPattern = ArtifactPattern {
    kind: "XGBoost model",
    prefix: "xgb_job_predictor",
    extension: None,
};
const XGB_FEATURES: ArtifactPattern = ArtifactPattern {
    kind: "XGBoost feature list",
    prefix: "xgb_feature_list",
    extension: None,
};
const XGB_LABELS: ArtifactPattern = ArtifactPattern {
    kind: "XGBoost label encoder",
    prefix: "xgb_label_encoder",
    extension: None,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub role: String,
    pub confidence: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_role: String,
    pub suggestions: Vec<Suggestion>,
    /// Only set by the resume endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_keywords: Option<Vec<String>>,
}

/// What was loaded, reported by the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub backend: &'static str,
    pub model_file: String,
    pub feature_file: String,
    pub label_file: Option<String>,
    pub n_features: usize,
    pub n_classes: usize,
    pub loaded_at: DateTime<Utc>,
}

pub struct RolePredictor {
    vocabulary: FeatureVocabulary,
    classifier: Box<dyn Classifier>,
    labels: Vec<String>,
    info: ModelInfo,
}

impl RolePredictor {
    /// Assembles a predictor from already-loaded parts, checking that they agree.
    pub fn new(
        vocabulary: FeatureVocabulary,
        classifier: Box<dyn Classifier>,
        labels: Vec<String>,
        files: ArtifactFiles,
    ) -> Result<Self, ModelError> {
        if vocabulary.is_empty() {
            return Err(ModelError::Invalid("feature vocabulary is empty".to_string()));
        }
        if vocabulary.len() != classifier.n_features() {
            return Err(ModelError::Invalid(format!(
                "feature list has {} entries but the model expects {}",
                vocabulary.len(),
                classifier.n_features()
            )));
        }
        if labels.len() != classifier.n_classes() {
            return Err(ModelError::Invalid(format!(
                "{} labels for a model with {} classes",
                labels.len(),
                classifier.n_classes()
            )));
        }

        let info = ModelInfo {
            backend: classifier.kind(),
            model_file: file_name(&files.model),
            feature_file: file_name(&files.features),
            label_file: files.labels.as_deref().map(file_name),
            n_features: vocabulary.len(),
            n_classes: labels.len(),
            loaded_at: Utc::now(),
        };

        Ok(Self {
            vocabulary,
            classifier,
            labels,
            info,
        })
    }

    /// Discovers and loads the artifacts for `variant` from `dir`.
    pub fn load(variant: Variant, dir: &Path) -> Result<Self, ModelError> {
        info!("Attempting to load {variant} model assets from '{}'", dir.display());
        match variant {
            Variant::Forest => Self::load_forest(dir),
            Variant::Boost | Variant::Resume => Self::load_boosted(dir),
        }
    }

    fn load_forest(dir: &Path) -> Result<Self, ModelError> {
        let model_path = find_artifact(dir, FOREST_MODEL, Pick::Newest)?;
        let feature_path = find_artifact(dir, FOREST_FEATURES, Pick::Newest)?;
        info!("Loading model: {}", model_path.display());
        info!("Loading features: {}", feature_path.display());

        let forest = RandomForest::from_json(&read_text(&model_path)?).map_err(|source| {
            ModelError::Parse {
                path: model_path.clone(),
                source,
            }
        })?;
        forest.validate()?;

        let labels = forest.classes().to_vec();
        let vocabulary = FeatureVocabulary::new(read_feature_list(&feature_path)?);

        Self::new(
            vocabulary,
            Box::new(forest),
            labels,
            ArtifactFiles {
                model: model_path,
                features: feature_path,
                labels: None,
            },
        )
    }

    fn load_boosted(dir: &Path) -> Result<Self, ModelError> {
        let model_path = find_artifact(dir, XGB_MODEL, Pick::LastByName)?;
        let feature_path = find_artifact(dir, XGB_FEATURES, Pick::LastByName)?;
        let label_path = find_artifact(dir, XGB_LABELS, Pick::LastByName)?;
        info!("Loading model: {}", model_path.display());
        info!("Loading features: {}", feature_path.display());
        info!("Loading encoder: {}", label_path.display());

        let booster = GradientBoosted::from_json(&read_text(&model_path)?)?;
        booster.validate()?;

        let vocabulary = FeatureVocabulary::new(read_feature_list(&feature_path)?);
        let labels = read_label_encoder(&label_path)?;

        Self::new(
            vocabulary,
            Box::new(booster),
            labels,
            ArtifactFiles {
                model: model_path,
                features: feature_path,
                labels: Some(label_path),
            },
        )
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }

    /// Encodes `skills`, runs inference, and returns the top suggestions.
    pub fn predict<S: AsRef<str>>(&self, skills: &[S]) -> Result<PredictionResponse, ModelError> {
        let profile = self.vocabulary.encode(skills);

        info!(
            "Received {} skill(s), matched {}: {:?}",
            skills.len(),
            profile.matched.len(),
            profile.matched
        );
        debug!(
            "Received skills: {:?}",
            skills.iter().map(|s| s.as_ref()).collect::<Vec<_>>()
        );

        let proba = self.classifier.predict_proba(&profile.vector)?;
        if proba.len() != self.labels.len() {
            return Err(ModelError::Invalid(format!(
                "model returned {} probabilities for {} labels",
                proba.len(),
                self.labels.len()
            )));
        }

        let ranked = top_k(&proba, TOP_K);
        let suggestions: Vec<Suggestion> = ranked
            .iter()
            .map(|&idx| Suggestion {
                role: self.labels[idx].clone(),
                confidence: format_confidence(proba[idx]),
            })
            .collect();

        let predicted_role = suggestions
            .first()
            .map(|s| s.role.clone())
            .ok_or_else(|| ModelError::Invalid("model returned no classes".to_string()))?;

        Ok(PredictionResponse {
            predicted_role,
            suggestions,
            extracted_keywords: None,
        })
    }
}

/// Paths the predictor was loaded from.
#[derive(Debug, Clone, Default)]
pub struct ArtifactFiles {
    pub model: PathBuf,
    pub features: PathBuf,
    pub labels: Option<PathBuf>,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
