//! QA agent engine: file intake, prompt construction, model client and effect execution.
mod adapter;
mod decode;
mod engine;
mod export;
mod filename;
mod gemini;
mod intake;
mod prompt;
mod types;

pub use adapter::{parse_test_cases, strip_code_fences, QaAdapter};
pub use decode::{decode_text, DecodedText};
pub use engine::{EngineConfig, EngineHandle, DEFAULT_BUILD_DELAY};
pub use export::{PersistError, ScriptExporter};
pub use filename::sanitize_file_name;
pub use gemini::{
    GeminiClient, ModelClient, ModelRequest, ModelSettings, DEFAULT_BASE_URL, DEFAULT_MODEL,
};
pub use intake::{read_file, read_files};
pub use prompt::{
    build_script_prompt, build_test_case_prompt, document_context, html_context,
    test_case_schema, NO_HTML_PROVIDED, SCRIPT_TEMPERATURE, TEST_CASE_SYSTEM_INSTRUCTION,
};
pub use types::{EngineEvent, GenerationError, IntakeError};
