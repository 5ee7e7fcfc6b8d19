use crate::{AppPhase, FileRole, TestCase, UploadedFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRowView {
    pub name: String,
    pub role: FileRole,
    pub size: u64,
}

impl From<&UploadedFile> for FileRowView {
    fn from(file: &UploadedFile) -> Self {
        Self {
            name: file.name.clone(),
            role: file.role,
            size: file.size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestBoardView {
    pub prompt: String,
    pub loading: bool,
    pub can_generate: bool,
    pub error: Option<String>,
    pub test_cases: Vec<TestCase>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenView {
    Ingestion {
        building: bool,
        intake_error: Option<String>,
    },
    TestGeneration(TestBoardView),
    ScriptGeneration {
        test_case: TestCase,
        generating: bool,
        /// Generated code, or the error placeholder when generation failed.
        code: Option<String>,
        can_export: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub phase: AppPhase,
    pub file_count: usize,
    pub documents: Vec<FileRowView>,
    /// The HTML page that will be sent to the model.
    pub html: Option<FileRowView>,
    /// HTML files present in the collection but never sent.
    pub unused_html_count: usize,
    pub can_build: bool,
    pub knowledge_base_ready: bool,
    pub screen: ScreenView,
    pub notice: Option<String>,
}
