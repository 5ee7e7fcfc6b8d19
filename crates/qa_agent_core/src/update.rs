use std::path::PathBuf;

use crate::state::{script_file_name, ScriptSession, ScriptStatus, TestBoard, TEST_GENERATION_FAILED};
use crate::{AppState, Effect, FileRole, Msg, Phase, RequestToken, TestCase, UploadedFile};

/// Pure update function: applies a message to state and returns any effects.
///
/// The phase only moves on three user intents: building the knowledge base
/// (completed by `KnowledgeBaseReady`), selecting a test case, and going back.
/// Generation results are applied only when their token matches the request
/// the current phase is waiting for; anything else is stale and dropped.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesSelected { role, paths } => files_selected(&mut state, role, paths),
        Msg::FilesLoaded { files } => {
            files_loaded(&mut state, files);
            Vec::new()
        }
        Msg::IntakeFailed { message } => {
            if let Phase::Ingestion { intake_error, .. } = &mut state.phase {
                *intake_error = Some(message);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::FileRemoved { name } => {
            if matches!(state.phase, Phase::Ingestion { .. })
                && state.files.remove_by_name(&name) > 0
            {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::BuildKnowledgeBaseClicked => build_clicked(&mut state),
        Msg::KnowledgeBaseReady => {
            if matches!(state.phase, Phase::Ingestion { building: true, .. }) {
                state.phase = Phase::TestGeneration(TestBoard::default());
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PromptChanged(text) => {
            if let Phase::TestGeneration(board) = &mut state.phase {
                board.prompt = text;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::GenerateTestsClicked => generate_tests(&mut state),
        Msg::TestCasesGenerated { token, test_cases } => {
            apply_test_result(&mut state, token, Ok(test_cases));
            Vec::new()
        }
        Msg::TestCasesFailed { token } => {
            apply_test_result(&mut state, token, Err(()));
            Vec::new()
        }
        Msg::TestCaseSelected { index } => select_test_case(&mut state, index),
        Msg::ScriptGenerated { token, code } => {
            apply_script_result(&mut state, token, ScriptStatus::Ready(code));
            Vec::new()
        }
        Msg::ScriptFailed { token } => {
            apply_script_result(&mut state, token, ScriptStatus::Failed);
            Vec::new()
        }
        Msg::BackClicked => back_to_tests(&mut state),
        Msg::ExportClicked => match &state.phase {
            Phase::ScriptGeneration(ScriptSession {
                test_case,
                script: ScriptStatus::Ready(code),
                ..
            }) => vec![Effect::ExportScript {
                file_name: script_file_name(&test_case.test_id),
                code: code.clone(),
            }],
            _ => Vec::new(),
        },
        Msg::ScriptExported { path } => {
            state.notice = Some(format!("Saved {}", path.display()));
            state.mark_dirty();
            Vec::new()
        }
        Msg::ExportFailed { message } => {
            state.notice = Some(format!("Export failed: {message}"));
            state.mark_dirty();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn files_selected(state: &mut AppState, role: FileRole, paths: Vec<PathBuf>) -> Vec<Effect> {
    if paths.is_empty() || !matches!(state.phase, Phase::Ingestion { .. }) {
        return Vec::new();
    }
    vec![Effect::ReadFiles { role, paths }]
}

fn files_loaded(state: &mut AppState, files: Vec<UploadedFile>) {
    // A selection that finishes reading after the build is discarded.
    let Phase::Ingestion { intake_error, .. } = &mut state.phase else {
        return;
    };
    *intake_error = None;
    state.files.add(files);
    state.mark_dirty();
}

fn build_clicked(state: &mut AppState) -> Vec<Effect> {
    let can_build = state.files.can_build();
    match &mut state.phase {
        Phase::Ingestion { building, .. } if can_build && !*building => {
            *building = true;
            state.mark_dirty();
            vec![Effect::BuildKnowledgeBase]
        }
        _ => Vec::new(),
    }
}

fn generate_tests(state: &mut AppState) -> Vec<Effect> {
    let ready = matches!(&state.phase, Phase::TestGeneration(board) if board.can_generate());
    if !ready {
        return Vec::new();
    }
    let token = state.allocate_token();
    let files = state.files.snapshot();
    let Phase::TestGeneration(board) = &mut state.phase else {
        return Vec::new();
    };
    board.pending = Some(token);
    board.error = None;
    let prompt = board.prompt.clone();
    state.mark_dirty();
    vec![Effect::GenerateTestCases {
        token,
        prompt,
        files,
    }]
}

fn apply_test_result(state: &mut AppState, token: RequestToken, result: Result<Vec<TestCase>, ()>) {
    let Phase::TestGeneration(board) = &mut state.phase else {
        return;
    };
    if board.pending != Some(token) {
        return;
    }
    board.pending = None;
    match result {
        Ok(test_cases) => {
            board.test_cases = test_cases;
            board.error = None;
        }
        Err(()) => board.error = Some(TEST_GENERATION_FAILED.to_string()),
    }
    state.mark_dirty();
}

fn select_test_case(state: &mut AppState, index: usize) -> Vec<Effect> {
    let valid = matches!(&state.phase, Phase::TestGeneration(board) if index < board.test_cases.len());
    if !valid {
        return Vec::new();
    }
    let Phase::TestGeneration(mut board) = std::mem::take(&mut state.phase) else {
        return Vec::new();
    };

    let mut effects = Vec::with_capacity(2);
    if let Some(pending) = board.pending.take() {
        effects.push(Effect::CancelGeneration { token: pending });
    }

    let token = state.allocate_token();
    let test_case = board.test_cases[index].clone();
    let files = state.files.snapshot();
    effects.push(Effect::GenerateScript {
        token,
        test_case: test_case.clone(),
        files: files.clone(),
    });
    state.phase = Phase::ScriptGeneration(ScriptSession {
        test_case,
        files,
        script: ScriptStatus::Generating(token),
        board,
    });
    state.notice = None;
    state.mark_dirty();
    effects
}

fn apply_script_result(state: &mut AppState, token: RequestToken, outcome: ScriptStatus) {
    let Phase::ScriptGeneration(session) = &mut state.phase else {
        return;
    };
    if session.script != ScriptStatus::Generating(token) {
        return;
    }
    session.script = outcome;
    state.mark_dirty();
}

fn back_to_tests(state: &mut AppState) -> Vec<Effect> {
    if !matches!(state.phase, Phase::ScriptGeneration(_)) {
        return Vec::new();
    }
    let Phase::ScriptGeneration(session) = std::mem::take(&mut state.phase) else {
        return Vec::new();
    };
    let effects = match session.script {
        ScriptStatus::Generating(token) => vec![Effect::CancelGeneration { token }],
        ScriptStatus::Ready(_) | ScriptStatus::Failed => Vec::new(),
    };
    state.phase = Phase::TestGeneration(session.board);
    state.notice = None;
    state.mark_dirty();
    effects
}
