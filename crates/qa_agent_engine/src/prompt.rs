//! Prompt construction for the two model calls.
//!
//! Test-case synthesis sends every document plus the first HTML page and asks
//! for a JSON array constrained by [`test_case_schema`]. Script synthesis sends
//! one test case with the same material and asks for bare Python code.

use qa_agent_core::{documents, first_html, TestCase, UploadedFile};
use serde_json::{json, Value};

pub const NO_HTML_PROVIDED: &str = "No HTML provided.";
pub const TEST_CASE_SYSTEM_INSTRUCTION: &str =
    "You are an autonomous QA agent. Always return a valid JSON array of test cases.";
/// Near-deterministic decoding for code output.
pub const SCRIPT_TEMPERATURE: f32 = 0.1;

/// Page name used in the generated script when no HTML file was supplied.
const FALLBACK_PAGE_NAME: &str = "index.html";

/// Every document as a delimited, labelled block, joined by a blank line.
pub fn document_context(files: &[UploadedFile]) -> String {
    documents(files)
        .map(|doc| {
            format!(
                "--- DOCUMENT: {name} ---\n{content}\n--- END DOCUMENT ---",
                name = doc.name,
                content = doc.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The first HTML page as a delimited block, or [`NO_HTML_PROVIDED`].
pub fn html_context(files: &[UploadedFile]) -> String {
    match first_html(files) {
        Some(html) => format!(
            "--- TARGET HTML: {name} ---\n{content}\n--- END HTML ---",
            name = html.name,
            content = html.content
        ),
        None => NO_HTML_PROVIDED.to_string(),
    }
}

pub fn build_test_case_prompt(user_prompt: &str, files: &[UploadedFile]) -> String {
    let docs = document_context(files);
    let html = html_context(files);
    format!(
        "You are an expert QA Automation Engineer.\n\
         Your goal is to generate comprehensive test cases grounded STRICTLY in the provided documentation.\n\
         Do not invent features. If a feature is not described in the documents or present in the HTML, do not test it.\n\
         Every test case must name the document it is based on in `groundedIn`.\n\
         \n\
         CONTEXT:\n\
         {docs}\n\
         \n\
         {html}\n\
         \n\
         USER REQUEST:\n\
         {user_prompt}\n"
    )
}

/// Response schema in the Gemini OpenAPI subset: an array of test-case
/// objects, five string fields, all required.
pub fn test_case_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "testId": { "type": "STRING" },
                "feature": { "type": "STRING" },
                "scenario": { "type": "STRING" },
                "expectedResult": { "type": "STRING" },
                "groundedIn": {
                    "type": "STRING",
                    "description": "The specific document name this test is based on."
                }
            },
            "required": ["testId", "feature", "scenario", "expectedResult", "groundedIn"]
        }
    })
}

pub fn build_script_prompt(test_case: &TestCase, files: &[UploadedFile]) -> String {
    let html = first_html(files);
    let html_content = html.map(|file| file.content.as_str()).unwrap_or_default();
    let page_name = html.map_or(FALLBACK_PAGE_NAME, |file| file.name.as_str());
    let docs = documents(files)
        .map(|doc| format!("--- DOCUMENT: {} ---\n{}", doc.name, doc.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are a Senior Python Selenium Automation Expert.\n\
         \n\
         TASK:\n\
         Generate a robust, runnable Python Selenium script for the following test case.\n\
         \n\
         TEST CASE:\n\
         ID: {id}\n\
         Feature: {feature}\n\
         Scenario: {scenario}\n\
         Expected Result: {expected}\n\
         \n\
         TARGET HTML CONTENT (use this for accurate selectors):\n\
         {html_content}\n\
         \n\
         SUPPORTING DOCS:\n\
         {docs}\n\
         \n\
         REQUIREMENTS:\n\
         1. IMPORTS:\n\
         \x20  - webdriver from selenium\n\
         \x20  - By from selenium.webdriver.common.by\n\
         \x20  - WebDriverWait from selenium.webdriver.support.ui\n\
         \x20  - expected_conditions as EC from selenium.webdriver.support\n\
         \x20  - os\n\
         \x20  - time only if absolutely necessary; prefer explicit waits\n\
         2. DRIVER SETUP:\n\
         \x20  - Initialize 'driver = webdriver.Chrome()'.\n\
         \x20  - Set an implicit wait: 'driver.implicitly_wait(10)'.\n\
         \x20  - Load the page from the working directory:\n\
         \x20    file_path = os.path.join(os.getcwd(), '{page_name}')\n\
         \x20    driver.get(f\"file:///{{file_path}}\")\n\
         3. TEST EXECUTION:\n\
         \x20  - Use 'WebDriverWait(driver, 10).until(EC...)' for critical interactions (buttons, dynamic elements).\n\
         \x20  - Use precise selectors found in the HTML content: prefer IDs, then CSS selectors; avoid positional selectors.\n\
         \x20  - Perform the actions described in the scenario.\n\
         4. ASSERTION & VALIDATION:\n\
         \x20  - Read the actual result from the page (text, element presence, etc.) and compare it with the expected result.\n\
         \x20  - Print \"TEST PASSED: [details]\" if it matches.\n\
         \x20  - Print \"TEST FAILED: [details]\" if it does not.\n\
         5. ROBUSTNESS:\n\
         \x20  - Wrap the execution logic in a 'try...finally' block so that 'driver.quit()' is ALWAYS called, even if the test fails.\n\
         6. OUTPUT FORMAT:\n\
         \x20  - Return ONLY the Python code.\n\
         \x20  - Do NOT wrap it in markdown code fences.\n\
         \x20  - Do NOT add explanations outside code comments.\n",
        id = test_case.test_id,
        feature = test_case.feature,
        scenario = test_case.scenario,
        expected = test_case.expected_result,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use qa_agent_core::FileRole;

    fn files() -> Vec<UploadedFile> {
        vec![
            UploadedFile::new("specs.md", "SAVE15 = 15% off", FileRole::Document),
            UploadedFile::new("checkout.html", "<button id=\"pay\">Pay</button>", FileRole::Html),
            UploadedFile::new("style.md", "Buttons are green", FileRole::Document),
            UploadedFile::new("old.html", "<p>old</p>", FileRole::Html),
        ]
    }

    #[test]
    fn documents_are_delimited_in_order() {
        let context = document_context(&files());
        assert_eq!(
            context,
            "--- DOCUMENT: specs.md ---\nSAVE15 = 15% off\n--- END DOCUMENT ---\n\n\
             --- DOCUMENT: style.md ---\nButtons are green\n--- END DOCUMENT ---"
        );
    }

    #[test]
    fn only_first_html_is_used() {
        let context = html_context(&files());
        assert!(context.starts_with("--- TARGET HTML: checkout.html ---\n"));
        assert!(context.ends_with("\n--- END HTML ---"));
        assert!(!context.contains("old.html"));
    }

    #[test]
    fn missing_html_uses_sentinel() {
        assert_eq!(html_context(&[]), NO_HTML_PROVIDED);
        let prompt = build_test_case_prompt("anything", &[]);
        assert!(prompt.contains(NO_HTML_PROVIDED));
    }

    #[test]
    fn test_prompt_has_grounding_and_request() {
        let prompt = build_test_case_prompt("Cover the discount field", &files());
        assert!(prompt.contains("grounded STRICTLY"));
        assert!(prompt.contains("Do not invent features"));
        assert!(prompt.ends_with("USER REQUEST:\nCover the discount field\n"));
    }

    #[test]
    fn schema_requires_all_fields() {
        let schema = test_case_schema();
        let required = schema["items"]["required"].as_array().unwrap();
        assert_eq!(required.len(), 5);
        assert_eq!(schema["type"], "ARRAY");
    }

    #[test]
    fn script_prompt_names_page_and_requirements() {
        let test_case = TestCase {
            test_id: "TC-9".into(),
            feature: "Pay".into(),
            scenario: "Click pay".into(),
            expected_result: "Payment Successful!".into(),
            grounded_in: "specs.md".into(),
        };
        let prompt = build_script_prompt(&test_case, &files());
        assert!(prompt.contains("ID: TC-9"));
        assert!(prompt.contains("os.path.join(os.getcwd(), 'checkout.html')"));
        assert!(prompt.contains("driver.get(f\"file:///{file_path}\")"));
        assert!(prompt.contains("   - Initialize 'driver = webdriver.Chrome()'."));
        assert!(prompt.contains("<button id=\"pay\">Pay</button>"));
        assert!(!prompt.contains("<p>old</p>"));
        assert!(prompt.contains("--- DOCUMENT: style.md ---\nButtons are green"));
        assert!(prompt.contains("try...finally"));
    }

    #[test]
    fn script_prompt_without_html_falls_back_to_index() {
        let test_case = TestCase {
            test_id: "TC-1".into(),
            feature: "f".into(),
            scenario: "s".into(),
            expected_result: "e".into(),
            grounded_in: "g".into(),
        };
        let prompt = build_script_prompt(&test_case, &[]);
        assert!(prompt.contains("'index.html'"));
    }
}
