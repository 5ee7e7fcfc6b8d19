use crate::view_model::{AppViewModel, FileRowView, ScreenView, TestBoardView};
use crate::{AppPhase, FileCollection, RequestToken, TestCase, UploadedFile};

pub const DEFAULT_TEST_PROMPT: &str =
    "Generate all positive and negative test cases for the discount code feature.";
pub const TEST_GENERATION_FAILED: &str = "Failed to generate test cases. Please try again.";
pub const SCRIPT_GENERATION_FAILED: &str = "# Error generating script. Please try again.";

/// Download name for a generated script.
pub fn script_file_name(test_id: &str) -> String {
    format!("{test_id}_selenium.py")
}

/// Data owned by the test-generation screen. Survives a trip through the
/// script screen so that going back shows the same list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestBoard {
    pub(crate) prompt: String,
    pub(crate) test_cases: Vec<TestCase>,
    pub(crate) pending: Option<RequestToken>,
    pub(crate) error: Option<String>,
}

impl Default for TestBoard {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_TEST_PROMPT.to_string(),
            test_cases: Vec::new(),
            pending: None,
            error: None,
        }
    }
}

impl TestBoard {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn test_cases(&self) -> &[TestCase] {
        &self.test_cases
    }

    pub fn pending(&self) -> Option<RequestToken> {
        self.pending
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(crate) fn can_generate(&self) -> bool {
        self.pending.is_none() && !self.prompt.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStatus {
    Generating(RequestToken),
    Ready(String),
    Failed,
}

/// Data owned by the script screen: the selected test case, the file
/// snapshot it is scripted against, and the suspended test board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSession {
    pub(crate) test_case: TestCase,
    pub(crate) files: Vec<UploadedFile>,
    pub(crate) script: ScriptStatus,
    pub(crate) board: TestBoard,
}

impl ScriptSession {
    pub fn test_case(&self) -> &TestCase {
        &self.test_case
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn script(&self) -> &ScriptStatus {
        &self.script
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Ingestion {
        building: bool,
        intake_error: Option<String>,
    },
    TestGeneration(TestBoard),
    ScriptGeneration(ScriptSession),
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Ingestion {
            building: false,
            intake_error: None,
        }
    }
}

impl Phase {
    pub fn kind(&self) -> AppPhase {
        match self {
            Phase::Ingestion { .. } => AppPhase::Ingestion,
            Phase::TestGeneration(_) => AppPhase::TestGeneration,
            Phase::ScriptGeneration(_) => AppPhase::ScriptGeneration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) files: FileCollection,
    pub(crate) phase: Phase,
    pub(crate) next_token: RequestToken,
    pub(crate) notice: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &FileCollection {
        &self.files
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn view(&self) -> AppViewModel {
        let documents = self.files.documents().map(FileRowView::from).collect();
        let html = self.files.first_html().map(FileRowView::from);
        let screen = match &self.phase {
            Phase::Ingestion {
                building,
                intake_error,
            } => ScreenView::Ingestion {
                building: *building,
                intake_error: intake_error.clone(),
            },
            Phase::TestGeneration(board) => ScreenView::TestGeneration(TestBoardView {
                prompt: board.prompt.clone(),
                loading: board.pending.is_some(),
                can_generate: board.can_generate(),
                error: board.error.clone(),
                test_cases: board.test_cases.clone(),
            }),
            Phase::ScriptGeneration(session) => {
                let (generating, code) = match &session.script {
                    ScriptStatus::Generating(_) => (true, None),
                    ScriptStatus::Ready(code) => (false, Some(code.clone())),
                    ScriptStatus::Failed => (false, Some(SCRIPT_GENERATION_FAILED.to_string())),
                };
                ScreenView::ScriptGeneration {
                    test_case: session.test_case.clone(),
                    generating,
                    can_export: matches!(session.script, ScriptStatus::Ready(_)),
                    code,
                }
            }
        };

        AppViewModel {
            phase: self.phase.kind(),
            file_count: self.files.len(),
            documents,
            html,
            unused_html_count: self.files.html_count().saturating_sub(1),
            can_build: self.files.can_build(),
            knowledge_base_ready: self.phase.kind() != AppPhase::Ingestion,
            screen,
            notice: self.notice.clone(),
        }
    }

    pub(crate) fn allocate_token(&mut self) -> RequestToken {
        self.next_token += 1;
        self.next_token
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
