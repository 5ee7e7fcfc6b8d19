use std::path::PathBuf;

use crate::{FileRole, RequestToken, TestCase, UploadedFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Read the selected paths from disk as files of `role`.
    ReadFiles { role: FileRole, paths: Vec<PathBuf> },
    /// Run the knowledge-base build delay, then report readiness.
    BuildKnowledgeBase,
    GenerateTestCases {
        token: RequestToken,
        prompt: String,
        files: Vec<UploadedFile>,
    },
    GenerateScript {
        token: RequestToken,
        test_case: TestCase,
        files: Vec<UploadedFile>,
    },
    /// Abort an in-flight generation request; its result must not arrive.
    CancelGeneration { token: RequestToken },
    ExportScript { file_name: String, code: String },
}
