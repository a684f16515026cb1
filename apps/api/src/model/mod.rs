//! Pre-trained classifiers loaded read-only from exported JSON artifacts.
//!
//! Both backends sit behind the `Classifier` trait so the predictor and the
//! handlers never know which one is serving.

use std::path::PathBuf;

use thiserror::Error;

pub mod artifacts;
pub mod boost;
pub mod forest;

pub use boost::GradientBoosted;
pub use forest::RandomForest;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Directory not found: '{0}'")]
    MissingDirectory(PathBuf),

    #[error("No {kind} artifact found in '{dir}'")]
    MissingArtifact { kind: &'static str, dir: PathBuf },

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid model: {0}")]
    Invalid(String),

    #[error("Unsupported model: {0}")]
    Unsupported(String),

    #[error("Expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },
}

/// A trained multi-class classifier. Implementations are immutable after
/// loading and safe to share across request tasks.
pub trait Classifier: Send + Sync {
    /// Width of the input vector the model was trained on.
    fn n_features(&self) -> usize;

    fn n_classes(&self) -> usize;

    /// Class probabilities for a single sample, indexed by encoded class.
    fn predict_proba(&self, features: &[f32]) -> Result<Vec<f32>, ModelError>;

    /// Short backend name for logs and the health endpoint.
    fn kind(&self) -> &'static str;
}

pub(crate) fn check_width(expected: usize, features: &[f32]) -> Result<(), ModelError> {
    if features.len() != expected {
        return Err(ModelError::FeatureCount {
            expected,
            actual: features.len(),
        });
    }
    Ok(())
}

/// Flattened binary decision tree shared by both backends.
///
/// Node `n` is a leaf when `left[n] < 0`. Internal nodes route on
/// `feature[n]` against `threshold[n]`; the comparison is backend-specific.
#[derive(Debug, Clone)]
pub(crate) struct TreeNodes {
    pub left: Vec<i64>,
    pub right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f32>,
}

impl TreeNodes {
    pub fn validate(&self, n_features: usize, tree: usize) -> Result<(), ModelError> {
        let n = self.left.len();
        if n == 0 {
            return Err(ModelError::Invalid(format!("tree {tree} has no nodes")));
        }
        if self.right.len() != n || self.feature.len() != n || self.threshold.len() != n {
            return Err(ModelError::Invalid(format!(
                "tree {tree} has node arrays of different lengths"
            )));
        }
        for node in 0..n {
            if self.left[node] < 0 {
                continue;
            }
            for child in [self.left[node], self.right[node]] {
                // Children always come after their parent in both export formats,
                // which also rules out cycles.
                if child <= node as i64 || child as usize >= n {
                    return Err(ModelError::Invalid(format!(
                        "tree {tree} node {node} has out-of-range child {child}"
                    )));
                }
            }
            let f = self.feature[node];
            if f < 0 || f as usize >= n_features {
                return Err(ModelError::Invalid(format!(
                    "tree {tree} node {node} splits on unknown feature {f}"
                )));
            }
        }
        Ok(())
    }

    /// Walks from the root to a leaf. `go_left` decides each split.
    pub fn leaf(&self, features: &[f32], go_left: impl Fn(f32, f32) -> bool) -> usize {
        let mut node = 0usize;
        while self.left[node] >= 0 {
            let x = features[self.feature[node] as usize];
            node = if go_left(x, self.threshold[node]) {
                self.left[node] as usize
            } else {
                self.right[node] as usize
            };
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump() -> TreeNodes {
        TreeNodes {
            left: vec![1, -1, -1],
            right: vec![2, -1, -1],
            feature: vec![0, -2, -2],
            threshold: vec![0.5, -2.0, -2.0],
        }
    }

    #[test]
    fn test_leaf_routes_by_comparison() {
        let tree = stump();
        assert_eq!(tree.leaf(&[0.0], |x, t| x <= t), 1);
        assert_eq!(tree.leaf(&[1.0], |x, t| x <= t), 2);
    }

    #[test]
    fn test_validate_accepts_stump() {
        assert!(stump().validate(1, 0).is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_feature() {
        let err = stump().validate(0, 0).unwrap_err();
        assert!(err.to_string().contains("unknown feature"));
    }

    #[test]
    fn test_validate_rejects_backwards_child() {
        let mut tree = stump();
        tree.right[0] = 0;
        assert!(tree.validate(1, 0).is_err());
    }

    #[test]
    fn test_check_width() {
        assert!(check_width(2, &[0.0, 1.0]).is_ok());
        assert!(matches!(
            check_width(2, &[0.0]),
            Err(ModelError::FeatureCount {
                expected: 2,
                actual: 1
            })
        ));
    }
}
