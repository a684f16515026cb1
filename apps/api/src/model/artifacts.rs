//! Artifact discovery and the small JSON side files (feature list, label encoder).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::ModelError;

/// How to choose between several files of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    /// Most recently modified file.
    Newest,
    /// Lexicographically greatest name. Timestamped names sort chronologically.
    LastByName,
}

/// One kind of artifact file, matched by name prefix and optional extension.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactPattern {
    pub kind: &'static str,
    pub prefix: &'static str,
    pub extension: Option<&'static str>,
}

impl ArtifactPattern {
    fn matches(&self, name: &str) -> bool {
        name.starts_with(self.prefix)
            && self
                .extension
                .map_or(true, |ext| name.ends_with(&format!(".{ext}")))
    }
}

/// Finds the artifact file matching `pattern` in `dir`.
pub fn find_artifact(dir: &Path, pattern: ArtifactPattern, pick: Pick) -> Result<PathBuf, ModelError> {
    if !dir.is_dir() {
        return Err(ModelError::MissingDirectory(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|source| ModelError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut candidates: Vec<(String, SystemTime)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ModelError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !pattern.matches(&name) {
            continue;
        }
        let meta = entry.metadata().map_err(|source| ModelError::Io {
            path: entry.path(),
            source,
        })?;
        if !meta.is_file() {
            continue;
        }
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        candidates.push((name, modified));
    }

    debug!(
        "Found {} candidate {} file(s) in {}",
        candidates.len(),
        pattern.kind,
        dir.display()
    );

    let chosen = match pick {
        Pick::Newest => candidates
            .into_iter()
            // ties on mtime fall back to the name so the choice is stable
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0))),
        Pick::LastByName => candidates.into_iter().max_by(|a, b| a.0.cmp(&b.0)),
    };

    chosen
        .map(|(name, _)| dir.join(name))
        .ok_or_else(|| ModelError::MissingArtifact {
            kind: pattern.kind,
            dir: dir.to_path_buf(),
        })
}

pub fn read_text(path: &Path) -> Result<String, ModelError> {
    fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|source| ModelError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads the model's column order.
pub fn read_feature_list(path: &Path) -> Result<Vec<String>, ModelError> {
    let features: Vec<String> = read_json(path)?;
    if features.is_empty() {
        return Err(ModelError::Invalid(format!(
            "feature list '{}' is empty",
            path.display()
        )));
    }
    Ok(features)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelEncoderFile {
    Plain(Vec<String>),
    Wrapped { classes: Vec<String> },
}

/// Reads class names in encoded order. Accepts a bare array or `{"classes": [...]}`.
pub fn read_label_encoder(path: &Path) -> Result<Vec<String>, ModelError> {
    let labels = match read_json::<LabelEncoderFile>(path)? {
        LabelEncoderFile::Plain(classes) | LabelEncoderFile::Wrapped { classes } => classes,
    };
    if labels.is_empty() {
        return Err(ModelError::Invalid(format!(
            "label encoder '{}' has no classes",
            path.display()
        )));
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    const FEATURES: ArtifactPattern = ArtifactPattern {
        kind: "feature list",
        prefix: "feature_list",
        extension: Some("json"),
    };

    fn touch(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_last_by_name_picks_greatest_name() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "feature_list_20240101.json", "[]");
        touch(dir.path(), "feature_list_20240301.json", "[]");
        touch(dir.path(), "feature_list_20240201.json", "[]");

        let found = find_artifact(dir.path(), FEATURES, Pick::LastByName).unwrap();
        assert_eq!(found.file_name().unwrap(), "feature_list_20240301.json");
    }

    #[test]
    fn test_newest_picks_latest_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let old = touch(dir.path(), "feature_list_b.json", "[]");
        touch(dir.path(), "feature_list_a.json", "[]");

        // Push the lexicographically greater file into the past.
        let past = SystemTime::now() - Duration::from_secs(3600);
        File::options()
            .write(true)
            .open(&old)
            .unwrap()
            .set_modified(past)
            .unwrap();

        let found = find_artifact(dir.path(), FEATURES, Pick::Newest).unwrap();
        assert_eq!(found.file_name().unwrap(), "feature_list_a.json");
    }

    #[test]
    fn test_extension_filter() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "feature_list.joblib", "");
        let err = find_artifact(dir.path(), FEATURES, Pick::Newest).unwrap_err();
        assert!(matches!(err, ModelError::MissingArtifact { .. }));
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_artifact(&dir.path().join("nope"), FEATURES, Pick::Newest).unwrap_err();
        assert!(matches!(err, ModelError::MissingDirectory(_)));
    }

    #[test]
    fn test_read_label_encoder_both_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let plain = touch(dir.path(), "plain.json", r#"["A", "B"]"#);
        let wrapped = touch(dir.path(), "wrapped.json", r#"{"classes": ["A", "B"]}"#);
        assert_eq!(read_label_encoder(&plain).unwrap(), vec!["A", "B"]);
        assert_eq!(read_label_encoder(&wrapped).unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_empty_feature_list_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "feature_list.json", "[]");
        assert!(matches!(
            read_feature_list(&path),
            Err(ModelError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_json_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "feature_list.json", "{not json");
        let err = read_feature_list(&path).unwrap_err();
        assert!(err.to_string().contains("feature_list.json"));
    }
}
