//! Random forest exported from scikit-learn's `tree_` arrays.

use serde::Deserialize;

use super::{check_width, Classifier, ModelError, TreeNodes};

#[derive(Debug, Deserialize)]
struct ForestFile {
    classes: Vec<String>,
    n_features: usize,
    estimators: Vec<EstimatorFile>,
}

#[derive(Debug, Deserialize)]
struct EstimatorFile {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f32>,
    /// Per-node class weights; only leaves are read.
    value: Vec<Vec<f32>>,
}

struct Estimator {
    nodes: TreeNodes,
    /// Leaf distributions, already normalized to sum to 1.
    leaf_proba: Vec<Vec<f32>>,
}

/// Averages the per-tree leaf class distributions, like scikit-learn's
/// `RandomForestClassifier.predict_proba`.
pub struct RandomForest {
    classes: Vec<String>,
    n_features: usize,
    estimators: Vec<Estimator>,
}

impl RandomForest {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: ForestFile = serde_json::from_str(json)?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: ForestFile) -> Self {
        let estimators = file
            .estimators
            .into_iter()
            .map(|e| Estimator {
                leaf_proba: e.value.into_iter().map(normalize).collect(),
                nodes: TreeNodes {
                    left: e.children_left,
                    right: e.children_right,
                    feature: e.feature,
                    threshold: e.threshold,
                },
            })
            .collect();

        Self {
            classes: file.classes,
            n_features: file.n_features,
            estimators,
        }
    }

    /// Class names in encoded order; the forest carries its own labels.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.classes.is_empty() {
            return Err(ModelError::Invalid("forest has no classes".to_string()));
        }
        if self.estimators.is_empty() {
            return Err(ModelError::Invalid("forest has no estimators".to_string()));
        }
        for (i, est) in self.estimators.iter().enumerate() {
            est.nodes.validate(self.n_features, i)?;
            if est.leaf_proba.len() != est.nodes.left.len() {
                return Err(ModelError::Invalid(format!(
                    "tree {i} has {} value rows for {} nodes",
                    est.leaf_proba.len(),
                    est.nodes.left.len()
                )));
            }
            if est.leaf_proba.iter().any(|row| row.len() != self.classes.len()) {
                return Err(ModelError::Invalid(format!(
                    "tree {i} has value rows not matching {} classes",
                    self.classes.len()
                )));
            }
        }
        Ok(())
    }
}

impl Classifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.classes.len()
    }

    fn predict_proba(&self, features: &[f32]) -> Result<Vec<f32>, ModelError> {
        check_width(self.n_features, features)?;

        let mut proba = vec![0.0f32; self.classes.len()];
        for est in &self.estimators {
            let leaf = est.nodes.leaf(features, |x, t| x <= t);
            for (acc, p) in proba.iter_mut().zip(&est.leaf_proba[leaf]) {
                *acc += p;
            }
        }

        let n = self.estimators.len() as f32;
        proba.iter_mut().for_each(|p| *p /= n);
        Ok(proba)
    }

    fn kind(&self) -> &'static str {
        "random_forest"
    }
}

fn normalize(mut row: Vec<f32>) -> Vec<f32> {
    let total: f32 = row.iter().sum();
    if total > 0.0 {
        row.iter_mut().for_each(|v| *v /= total);
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two trees over features [python, figma]; classes [Backend, Designer].
    const FOREST: &str = r#"{
        "classes": ["Backend Developer", "UI Designer"],
        "n_features": 2,
        "estimators": [
            {
                "children_left": [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature": [0, -2, -2],
                "threshold": [0.5, -2.0, -2.0],
                "value": [[5.0, 5.0], [1.0, 4.0], [4.0, 1.0]]
            },
            {
                "children_left": [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature": [1, -2, -2],
                "threshold": [0.5, -2.0, -2.0],
                "value": [[5.0, 5.0], [3.0, 1.0], [0.0, 2.0]]
            }
        ]
    }"#;

    fn forest() -> RandomForest {
        let f = RandomForest::from_json(FOREST).unwrap();
        f.validate().unwrap();
        f
    }

    #[test]
    fn test_predict_proba_averages_normalized_leaves() {
        let f = forest();
        // python=1 -> tree0 right leaf [0.8, 0.2]; figma=0 -> tree1 left leaf [0.75, 0.25]
        let p = f.predict_proba(&[1.0, 0.0]).unwrap();
        assert!((p[0] - 0.775).abs() < 1e-6);
        assert!((p[1] - 0.225).abs() < 1e-6);
    }

    #[test]
    fn test_predict_proba_sums_to_one() {
        let f = forest();
        for x in [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0]] {
            let total: f32 = f.predict_proba(&x).unwrap().iter().sum();
            assert!((total - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_designer_profile_prefers_designer() {
        let p = forest().predict_proba(&[0.0, 1.0]).unwrap();
        assert!(p[1] > p[0]);
    }

    #[test]
    fn test_wrong_width_is_rejected() {
        assert!(matches!(
            forest().predict_proba(&[1.0]),
            Err(ModelError::FeatureCount { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_value_width_mismatch() {
        let json = FOREST.replace("[1.0, 4.0]", "[1.0, 4.0, 0.0]");
        let f = RandomForest::from_json(&json).unwrap();
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_forest() {
        let f = RandomForest::from_json(
            r#"{"classes": ["A"], "n_features": 1, "estimators": []}"#,
        )
        .unwrap();
        assert!(f.validate().is_err());
    }
}
