use std::fmt;

use serde::{Deserialize, Serialize};

/// Tag attached to every generation request so late results can be matched
/// against the request the state is still waiting for.
pub type RequestToken = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileRole {
    /// Supporting documentation (specs, user stories, notes).
    Document,
    /// The HTML page under test.
    Html,
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileRole::Document => write!(f, "document"),
            FileRole::Html => write!(f, "html"),
        }
    }
}

/// A file loaded into the session. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub content: String,
    pub role: FileRole,
    /// Size of the file on disk in bytes, before decoding.
    pub size: u64,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>, role: FileRole) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            size: content.len() as u64,
            content,
            role,
        }
    }
}

/// A generated test case. Field names follow the JSON schema the model is
/// constrained to (`testId`, `expectedResult`, `groundedIn`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub test_id: String,
    pub feature: String,
    pub scenario: String,
    pub expected_result: String,
    /// Name of the source document the test is based on.
    pub grounded_in: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppPhase {
    #[default]
    Ingestion,
    TestGeneration,
    ScriptGeneration,
}
