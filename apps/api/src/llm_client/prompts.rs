// Prompt text for keyword extraction.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

pub const SKILL_EXTRACTION_PROMPT_TEMPLATE: &str = "\
    From the following resume text, extract a list of all relevant professional skills \
    (technical skills, software, and soft skills). \
    Return the skills as a simple JSON array of strings. \
    For example: [\"Python\", \"Project Management\", \"AWS\"]. \
    Resume text: \"{resume_text}\"";

pub fn skill_extraction_prompt(resume_text: &str) -> String {
    SKILL_EXTRACTION_PROMPT_TEMPLATE.replace("{resume_text}", resume_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_resume_text() {
        let prompt = skill_extraction_prompt("Built ETL jobs in Rust");
        assert!(prompt.contains("\"Built ETL jobs in Rust\""));
        assert!(!prompt.contains("{resume_text}"));
    }
}
