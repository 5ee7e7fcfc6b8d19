use std::path::PathBuf;

use crate::{FileRole, RequestToken, TestCase, UploadedFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked files from disk for the given role.
    FilesSelected { role: FileRole, paths: Vec<PathBuf> },
    /// Engine finished reading a selection.
    FilesLoaded { files: Vec<UploadedFile> },
    /// Engine could not read a selection; nothing was added.
    IntakeFailed { message: String },
    /// User removed a file by name.
    FileRemoved { name: String },
    /// User clicked "Build Knowledge Base".
    BuildKnowledgeBaseClicked,
    /// Engine finished the knowledge-base build delay.
    KnowledgeBaseReady,
    /// User edited the test-generation prompt.
    PromptChanged(String),
    /// User asked for test cases.
    GenerateTestsClicked,
    TestCasesGenerated {
        token: RequestToken,
        test_cases: Vec<TestCase>,
    },
    TestCasesFailed { token: RequestToken },
    /// User picked a test case (index into the current list) to script.
    TestCaseSelected { index: usize },
    ScriptGenerated { token: RequestToken, code: String },
    ScriptFailed { token: RequestToken },
    /// User left the script view.
    BackClicked,
    /// User asked to save the current script.
    ExportClicked,
    ScriptExported { path: PathBuf },
    ExportFailed { message: String },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
