use std::sync::Arc;

use agent_logging::{agent_debug, agent_error, agent_info, excerpt};
use qa_agent_core::{TestCase, UploadedFile};

use crate::gemini::{ModelClient, ModelRequest};
use crate::prompt::{
    build_script_prompt, build_test_case_prompt, test_case_schema, SCRIPT_TEMPERATURE,
    TEST_CASE_SYSTEM_INSTRUCTION,
};
use crate::GenerationError;

const FENCE: &str = "```";
const LOG_EXCERPT: usize = 160;
/// Language tags stripped even when code follows on the fence line.
const SCRIPT_TAGS: &[&str] = &["python", "python3", "py"];

/// Turns session material into model requests and model output into
/// test cases or script text. No retries: every failure goes to the caller.
#[derive(Clone)]
pub struct QaAdapter {
    client: Arc<dyn ModelClient>,
}

impl QaAdapter {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    /// Asks for test cases covering `prompt`, grounded in `files`. The file
    /// collection is sent as-is, even when it holds no documents or HTML.
    pub async fn generate_test_cases(
        &self,
        prompt: &str,
        files: &[UploadedFile],
    ) -> Result<Vec<TestCase>, GenerationError> {
        let request = ModelRequest {
            prompt: build_test_case_prompt(prompt, files),
            system_instruction: Some(TEST_CASE_SYSTEM_INSTRUCTION.to_string()),
            temperature: None,
            response_schema: Some(test_case_schema()),
        };
        let text = self.client.generate(&request).await.inspect_err(|err| {
            agent_error!("Error generating test cases: {}", err);
        })?;
        agent_debug!("Test case response: {}", excerpt(&text, LOG_EXCERPT));

        let test_cases = parse_test_cases(&text).inspect_err(|err| {
            agent_error!("Error generating test cases: {}", err);
        })?;
        agent_info!("Generated {} test cases", test_cases.len());
        Ok(test_cases)
    }

    /// Asks for a runnable Python Selenium script for `test_case`. The
    /// output is not checked for syntax.
    pub async fn generate_selenium_script(
        &self,
        test_case: &TestCase,
        files: &[UploadedFile],
    ) -> Result<String, GenerationError> {
        let request = ModelRequest {
            prompt: build_script_prompt(test_case, files),
            system_instruction: None,
            temperature: Some(SCRIPT_TEMPERATURE),
            response_schema: None,
        };
        let raw = self.client.generate(&request).await.inspect_err(|err| {
            agent_error!("Error generating script for {}: {}", test_case.test_id, err);
        })?;

        let code = strip_code_fences(&raw);
        if code.is_empty() {
            agent_error!("Empty script for {}", test_case.test_id);
            return Err(GenerationError::EmptyResponse);
        }
        agent_info!(
            "Generated script for {} ({} lines)",
            test_case.test_id,
            code.lines().count()
        );
        Ok(code)
    }
}

/// Parses a JSON array of test cases. Blank text is an empty response, not
/// an empty list.
pub fn parse_test_cases(text: &str) -> Result<Vec<TestCase>, GenerationError> {
    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    serde_json::from_str(text).map_err(|err| GenerationError::InvalidTestCases(err.to_string()))
}

/// Removes markdown code fences wrapped around model output and trims it.
///
/// An opening fence may carry a language tag in any case (```` ```python ````,
/// ```` ```PY ````). Applying this twice gives the same result as once.
pub fn strip_code_fences(raw: &str) -> String {
    let mut text = raw.trim();
    loop {
        let before = text.len();
        if let Some(rest) = strip_opening_fence(text) {
            text = rest.trim();
        }
        if let Some(rest) = text.strip_suffix(FENCE) {
            text = rest.trim();
        }
        if text.len() == before {
            return text.to_string();
        }
    }
}

fn strip_opening_fence(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(FENCE)?;
    let line_end = rest.find('\n').unwrap_or(rest.len());
    let line = &rest[..line_end];
    let is_tag = line
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '_' | '.'));
    if is_tag {
        return Some(&rest[line_end..]);
    }
    // Code on the fence line itself, e.g. ```python import os
    match line.split_once(char::is_whitespace) {
        Some((word, _)) if SCRIPT_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(word)) => {
            Some(&rest[word.len()..])
        }
        _ => Some(rest),
    }
}
