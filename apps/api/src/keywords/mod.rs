//! Resume keyword extraction — turns free resume text into a skills list the
//! predictor can vectorize.
//!
//! `AppState` holds an `Arc<dyn KeywordExtractor>` so handlers and tests never
//! depend on the Gemini backend directly.

use async_trait::async_trait;
use tracing::debug;

use crate::llm_client::prompts::{skill_extraction_prompt, JSON_ONLY_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};

#[async_trait]
pub trait KeywordExtractor: Send + Sync {
    async fn extract(&self, resume_text: &str) -> Result<Vec<String>, LlmError>;

    /// Backend name for the health endpoint.
    fn backend(&self) -> String;
}

/// Asks Gemini for a JSON array of skills.
pub struct GeminiKeywordExtractor {
    llm: LlmClient,
}

impl GeminiKeywordExtractor {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl KeywordExtractor for GeminiKeywordExtractor {
    async fn extract(&self, resume_text: &str) -> Result<Vec<String>, LlmError> {
        let prompt = skill_extraction_prompt(resume_text);
        let raw: Vec<String> = self.llm.call_json(&prompt, JSON_ONLY_SYSTEM).await?;
        debug!("Gemini returned {} raw keyword(s)", raw.len());
        Ok(clean_keywords(raw))
    }

    fn backend(&self) -> String {
        format!("gemini:{}", self.llm.model())
    }
}

/// Trims whitespace and drops blank entries; order and duplicates are kept.
pub fn clean_keywords(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    /// Returns a canned keyword list, or an error when `keywords` is `None`.
    pub(crate) struct StaticExtractor {
        pub keywords: Option<Vec<String>>,
    }

    #[async_trait]
    impl KeywordExtractor for StaticExtractor {
        async fn extract(&self, _resume_text: &str) -> Result<Vec<String>, LlmError> {
            self.keywords.clone().ok_or(LlmError::EmptyContent)
        }

        fn backend(&self) -> String {
            "static".to_string()
        }
    }

    #[test]
    fn test_clean_keywords() {
        let raw = vec![" Python ".into(), "".into(), "  ".into(), "AWS".into()];
        assert_eq!(clean_keywords(raw), vec!["Python", "AWS"]);
    }

    #[tokio::test]
    async fn test_gemini_extractor_sends_resume_and_parses_array() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/gemini-1.5-flash-latest:generateContent")
                    .body_contains("Led a team of five");
                then.status(200).json_body(json!({
                    "candidates": [{
                        "content": {"parts": [{"text": "[\"Leadership\", \" Rust \"]"}]}
                    }]
                }));
            })
            .await;

        let llm = LlmClient::new(
            "key".to_string(),
            "gemini-1.5-flash-latest".to_string(),
            server.base_url(),
        )
        .unwrap();
        let extractor = GeminiKeywordExtractor::new(llm);

        let keywords = extractor.extract("Led a team of five").await.unwrap();
        mock.assert_async().await;
        assert_eq!(keywords, vec!["Leadership", "Rust"]);
        assert_eq!(extractor.backend(), "gemini:gemini-1.5-flash-latest");
    }

    #[tokio::test]
    async fn test_gemini_extractor_rejects_non_array_reply() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({
                    "candidates": [{"content": {"parts": [{"text": "Sorry, I can't help."}]}}]
                }));
            })
            .await;

        let llm = LlmClient::new("key".into(), "m".into(), server.base_url()).unwrap();
        let err = GeminiKeywordExtractor::new(llm)
            .extract("text")
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }
}
