//! Skill vocabulary — maps free-form skill strings onto the model's columns.

use std::collections::HashMap;

/// The model's feature columns plus a case-insensitive index over them.
#[derive(Debug, Clone)]
pub struct FeatureVocabulary {
    names: Vec<String>,
    lookup: HashMap<String, usize>,
}

/// A one-hot skill profile ready for inference.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedProfile {
    pub vector: Vec<f32>,
    /// Matched skills in the vocabulary's spelling, in request order.
    pub matched: Vec<String>,
}

impl FeatureVocabulary {
    /// Builds the lookup. Names that collide case-insensitively resolve to the
    /// last one in column order.
    pub fn new(names: Vec<String>) -> Self {
        let lookup = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_lowercase(), i))
            .collect();
        Self { names, lookup }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Canonical column for `skill`, if the model knows it.
    pub fn resolve(&self, skill: &str) -> Option<usize> {
        self.lookup.get(&skill.to_lowercase()).copied()
    }

    /// Sets every known skill's column to 1.0 and leaves the rest at 0.0.
    /// Unknown skills are ignored.
    pub fn encode<S: AsRef<str>>(&self, skills: &[S]) -> EncodedProfile {
        let mut vector = vec![0.0f32; self.names.len()];
        let mut matched = Vec::new();

        for skill in skills {
            if let Some(idx) = self.resolve(skill.as_ref()) {
                vector[idx] = 1.0;
                matched.push(self.names[idx].clone());
            }
        }

        EncodedProfile { vector, matched }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> FeatureVocabulary {
        FeatureVocabulary::new(
            ["Python", "SQL", "Project Management", "AWS", "Figma"]
                .into_iter()
                .map(String::from)
                .collect(),
        )
    }

    #[test]
    fn test_encode_sets_exactly_matched_columns() {
        let profile = vocab().encode(&["python", "aws", "Rust"]);
        assert_eq!(profile.vector, vec![1.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(profile.matched, vec!["Python", "AWS"]);
    }

    #[test]
    fn test_encode_is_case_insensitive_for_multiword_skills() {
        let profile = vocab().encode(&["PROJECT MANAGEMENT"]);
        assert_eq!(profile.vector[2], 1.0);
        assert_eq!(profile.matched, vec!["Project Management"]);
    }

    #[test]
    fn test_encode_empty_input_is_all_zeros() {
        let profile = vocab().encode::<&str>(&[]);
        assert!(profile.vector.iter().all(|v| *v == 0.0));
        assert!(profile.matched.is_empty());
    }

    #[test]
    fn test_duplicate_skills_set_column_once() {
        let profile = vocab().encode(&["SQL", "sql"]);
        assert_eq!(profile.vector.iter().filter(|v| **v == 1.0).count(), 1);
        assert_eq!(profile.matched, vec!["SQL", "SQL"]);
    }

    #[test]
    fn test_whitespace_is_not_trimmed() {
        // Lookup is exact apart from case, so padded input does not match.
        assert!(vocab().resolve(" python").is_none());
    }

    #[test]
    fn test_case_collision_resolves_to_last_column() {
        let v = FeatureVocabulary::new(vec!["Go".into(), "GO".into()]);
        assert_eq!(v.resolve("go"), Some(1));
        assert_eq!(v.encode(&["gO"]).vector, vec![0.0, 1.0]);
    }
}
