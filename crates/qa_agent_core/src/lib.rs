//! QA agent core: data model, file collection, pure phase state machine and view-model helpers.
mod effect;
mod files;
mod msg;
mod state;
mod types;
mod update;
mod view_model;

pub use effect::Effect;
pub use files::{documents, first_html, FileCollection};
pub use msg::Msg;
pub use state::{
    script_file_name, AppState, Phase, ScriptSession, ScriptStatus, TestBoard,
    DEFAULT_TEST_PROMPT, SCRIPT_GENERATION_FAILED, TEST_GENERATION_FAILED,
};
pub use types::{AppPhase, FileRole, RequestToken, TestCase, UploadedFile};
pub use update::update;
pub use view_model::{AppViewModel, FileRowView, ScreenView, TestBoardView};
