//! Gradient boosted trees read from XGBoost's native JSON model format
//! (`Booster.save_model("model.json")`).
//!
//! Only the fields needed for inference are read. XGBoost writes most scalar
//! parameters as strings (`"num_class": "12"`, `"base_score": "5E-1"`), so
//! those go through `Scalar`.

use serde::Deserialize;

use super::{check_width, Classifier, ModelError, TreeNodes};

#[derive(Debug, Deserialize)]
struct BoosterFile {
    learner: LearnerFile,
}

#[derive(Debug, Deserialize)]
struct LearnerFile {
    learner_model_param: ModelParam,
    objective: ObjectiveFile,
    gradient_booster: GradientBoosterFile,
}

#[derive(Debug, Deserialize)]
struct ModelParam {
    #[serde(default)]
    base_score: Option<Scalar>,
    num_class: Scalar,
    num_feature: Scalar,
}

#[derive(Debug, Deserialize)]
struct ObjectiveFile {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GradientBoosterFile {
    name: String,
    #[serde(default)]
    model: Option<GbTreeFile>,
}

#[derive(Debug, Deserialize)]
struct GbTreeFile {
    trees: Vec<TreeFile>,
    tree_info: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct TreeFile {
    left_children: Vec<i64>,
    right_children: Vec<i64>,
    split_indices: Vec<i64>,
    split_conditions: Vec<f32>,
}

/// Upper bound for `num_class` / `num_feature`; larger values are corrupt.
const MAX_COUNT: usize = 1 << 20;

/// Number or numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    fn values(&self) -> Result<Vec<f32>, ModelError> {
        match self {
            Scalar::Number(n) => Ok(vec![*n as f32]),
            Scalar::Text(s) => {
                let s = s.trim();
                let inner = s
                    .strip_prefix('[')
                    .and_then(|rest| rest.strip_suffix(']'))
                    .unwrap_or(s);
                inner
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| {
                        v.parse::<f32>().map_err(|_| {
                            ModelError::Invalid(format!("'{s}' is not a number"))
                        })
                    })
                    .collect()
            }
        }
    }

    fn single(&self) -> Result<f32, ModelError> {
        match self.values()?.as_slice() {
            [v] => Ok(*v),
            other => Err(ModelError::Invalid(format!(
                "expected one value, got {}",
                other.len()
            ))),
        }
    }

    fn count(&self) -> Result<usize, ModelError> {
        let v = self.single()?;
        if v < 0.0 || v.fract() != 0.0 {
            return Err(ModelError::Invalid(format!("'{v}' is not a count")));
        }
        if v > MAX_COUNT as f32 {
            return Err(ModelError::Invalid(format!(
                "'{v}' exceeds the limit of {MAX_COUNT}"
            )));
        }
        Ok(v as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Objective {
    /// `multi:softprob` / `multi:softmax`: one tree group per class.
    Softmax,
    /// `binary:logistic`: a single margin mapped to two classes.
    Logistic,
}

/// Multi-class gradient boosted tree ensemble.
pub struct GradientBoosted {
    objective: Objective,
    n_features: usize,
    n_classes: usize,
    /// Starting margin per output group.
    base_margin: Vec<f32>,
    trees: Vec<TreeNodes>,
    /// Output group (class) each tree contributes to.
    tree_group: Vec<usize>,
}

impl GradientBoosted {
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let file: BoosterFile = serde_json::from_str(json).map_err(|e| {
            ModelError::Invalid(format!("not an XGBoost JSON model: {e}"))
        })?;
        Self::from_file(file)
    }

    fn from_file(file: BoosterFile) -> Result<Self, ModelError> {
        let learner = file.learner;

        if learner.gradient_booster.name != "gbtree" {
            return Err(ModelError::Unsupported(format!(
                "booster '{}' (only gbtree is supported)",
                learner.gradient_booster.name
            )));
        }

        let objective = match learner.objective.name.as_str() {
            "multi:softprob" | "multi:softmax" => Objective::Softmax,
            "binary:logistic" => Objective::Logistic,
            other => {
                return Err(ModelError::Unsupported(format!("objective '{other}'")));
            }
        };

        let params = learner.learner_model_param;
        let n_features = params.num_feature.count()?;
        let (n_classes, groups) = match objective {
            Objective::Softmax => {
                let n = params.num_class.count()?;
                (n, n)
            }
            Objective::Logistic => (2, 1),
        };

        let base_values = match &params.base_score {
            Some(s) => s.values()?,
            None => vec![0.5],
        };
        let base_margin = match (objective, base_values.as_slice()) {
            (Objective::Logistic, [p]) => vec![logit(*p)],
            (Objective::Softmax, [b]) => vec![*b; groups],
            (Objective::Softmax, per_class) if per_class.len() == groups => per_class.to_vec(),
            (_, other) => {
                return Err(ModelError::Invalid(format!(
                    "base_score has {} values for {groups} output groups",
                    other.len()
                )));
            }
        };

        let model = learner
            .gradient_booster
            .model
            .ok_or_else(|| ModelError::Invalid("booster has no trees".to_string()))?;

        let trees = model
            .trees
            .into_iter()
            .map(|t| TreeNodes {
                left: t.left_children,
                right: t.right_children,
                feature: t.split_indices,
                threshold: t.split_conditions,
            })
            .collect();

        Ok(Self {
            objective,
            n_features,
            n_classes,
            base_margin,
            trees,
            tree_group: model.tree_info,
        })
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.n_classes == 0 {
            return Err(ModelError::Invalid("num_class is 0".to_string()));
        }
        if self.trees.is_empty() {
            return Err(ModelError::Invalid("booster has no trees".to_string()));
        }
        if self.tree_group.len() != self.trees.len() {
            return Err(ModelError::Invalid(format!(
                "tree_info has {} entries for {} trees",
                self.tree_group.len(),
                self.trees.len()
            )));
        }
        let groups = self.base_margin.len();
        if let Some(g) = self.tree_group.iter().find(|g| **g >= groups) {
            return Err(ModelError::Invalid(format!(
                "tree assigned to group {g} but model has {groups}"
            )));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, i)?;
        }
        Ok(())
    }

    fn margins(&self, features: &[f32]) -> Vec<f32> {
        let mut margins = self.base_margin.clone();
        for (tree, &group) in self.trees.iter().zip(&self.tree_group) {
            // Leaf values live in split_conditions.
            let leaf = tree.leaf(features, |x, t| x < t);
            margins[group] += tree.threshold[leaf];
        }
        margins
    }
}

impl Classifier for GradientBoosted {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, features: &[f32]) -> Result<Vec<f32>, ModelError> {
        check_width(self.n_features, features)?;
        let margins = self.margins(features);
        Ok(match self.objective {
            Objective::Softmax => softmax(&margins),
            Objective::Logistic => {
                let p = sigmoid(margins[0]);
                vec![1.0 - p, p]
            }
        })
    }

    fn kind(&self) -> &'static str {
        "gradient_boosted"
    }
}

fn softmax(margins: &[f32]) -> Vec<f32> {
    let max = margins.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = margins.iter().map(|m| (m - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

fn logit(p: f32) -> f32 {
    let p = p.clamp(1e-7, 1.0 - 1e-7);
    (p / (1.0 - p)).ln()
}
