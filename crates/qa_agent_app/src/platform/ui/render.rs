use std::fmt::Write;

use qa_agent_core::{AppPhase, AppViewModel, FileRowView, ScreenView, TestBoardView, TestCase};

const STEPS: [(AppPhase, &str); 3] = [
    (AppPhase::Ingestion, "Ingestion"),
    (AppPhase::TestGeneration, "Test Generation"),
    (AppPhase::ScriptGeneration, "Script Generation"),
];

/// Renders the whole screen as text. Output always ends with a newline.
pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    let _ = write_screen(&mut out, view);
    out
}

fn write_screen(out: &mut String, view: &AppViewModel) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "{}", stepper(view.phase))?;
    writeln!(out, "{}", session_line(view))?;
    writeln!(out)?;

    match &view.screen {
        ScreenView::Ingestion {
            building,
            intake_error,
        } => write_ingestion(out, view, *building, intake_error.as_deref())?,
        ScreenView::TestGeneration(board) => write_board(out, board)?,
        ScreenView::ScriptGeneration {
            test_case,
            generating,
            code,
            can_export,
        } => write_script(out, test_case, *generating, code.as_deref(), *can_export)?,
    }

    if let Some(notice) = &view.notice {
        writeln!(out)?;
        writeln!(out, "> {notice}")?;
    }
    Ok(())
}

fn stepper(phase: AppPhase) -> String {
    let steps = STEPS
        .iter()
        .enumerate()
        .map(|(i, (step, label))| {
            if *step == phase {
                format!("[{} {}]", i + 1, label)
            } else {
                format!("{} {}", i + 1, label)
            }
        })
        .collect::<Vec<_>>()
        .join(" > ");
    format!("== QA Agent ==  {steps}")
}

fn session_line(view: &AppViewModel) -> String {
    let html = match &view.html {
        Some(file) => file.name.as_str(),
        None => "no HTML",
    };
    let kb = if view.knowledge_base_ready {
        "knowledge base ready"
    } else {
        "knowledge base not built"
    };
    format!(
        "Session: {} | {} ({}), {} | {}",
        plural(view.file_count, "file"),
        plural(view.documents.len(), "document"),
        format_size(view.documents.iter().map(|doc| doc.size).sum()),
        html,
        kb
    )
}

fn write_ingestion(
    out: &mut String,
    view: &AppViewModel,
    building: bool,
    intake_error: Option<&str>,
) -> std::fmt::Result {
    writeln!(out, "Documents:")?;
    if view.documents.is_empty() {
        writeln!(out, "  (none; add with `doc <path>...`)")?;
    }
    for doc in &view.documents {
        writeln!(out, "  - {}", file_row(doc))?;
    }

    writeln!(out, "HTML:")?;
    match &view.html {
        Some(html) => writeln!(out, "  - {}", file_row(html))?,
        None => writeln!(out, "  (none; add with `html <path>`)")?,
    }
    if view.unused_html_count > 0 {
        writeln!(
            out,
            "  ({} not used; only the first HTML file is sent)",
            plural(view.unused_html_count, "more HTML file")
        )?;
    }

    if let Some(error) = intake_error {
        writeln!(out)?;
        writeln!(out, "Could not add files: {error}")?;
    }

    writeln!(out)?;
    if building {
        writeln!(out, "Building knowledge base...")?;
    } else if view.can_build {
        writeln!(out, "Next: `build` to build the knowledge base.")?;
    } else {
        writeln!(
            out,
            "Add at least one document and one HTML file to build the knowledge base."
        )?;
    }
    Ok(())
}

fn write_board(out: &mut String, board: &TestBoardView) -> std::fmt::Result {
    writeln!(out, "Request: {}", board.prompt)?;
    if board.loading {
        writeln!(out, "Generating test cases...")?;
    }
    if let Some(error) = &board.error {
        writeln!(out, "{error}")?;
    }
    writeln!(out)?;

    if board.test_cases.is_empty() {
        writeln!(out, "No test cases yet.")?;
    } else {
        writeln!(out, "Test cases ({}):", board.test_cases.len())?;
        for (i, case) in board.test_cases.iter().enumerate() {
            writeln!(out, "  {}. [{}] {}", i + 1, case.test_id, case.feature)?;
            writeln!(out, "     Scenario: {}", case.scenario)?;
            writeln!(out, "     Expected: {}", case.expected_result)?;
            writeln!(out, "     Grounded in: {}", case.grounded_in)?;
        }
    }

    writeln!(out)?;
    if board.test_cases.is_empty() {
        writeln!(out, "Next: `prompt <text>` then `generate`.")?;
    } else {
        writeln!(out, "Next: `select <n>` to write a Selenium script, or `generate` again.")?;
    }
    Ok(())
}

fn write_script(
    out: &mut String,
    test_case: &TestCase,
    generating: bool,
    code: Option<&str>,
    can_export: bool,
) -> std::fmt::Result {
    writeln!(out, "[{}] {}", test_case.test_id, test_case.feature)?;
    writeln!(out, "Scenario: {}", test_case.scenario)?;
    writeln!(out, "Expected: {}", test_case.expected_result)?;
    writeln!(out)?;

    if generating {
        writeln!(out, "Writing Selenium script...")?;
    }
    if let Some(code) = code {
        writeln!(out, "--- script ---")?;
        writeln!(out, "{code}")?;
        writeln!(out, "--- end ---")?;
    }

    writeln!(out)?;
    if can_export {
        writeln!(out, "Next: `export` to save the script, or `back` to the list.")?;
    } else {
        writeln!(out, "Next: `back` to the list.")?;
    }
    Ok(())
}

fn file_row(file: &FileRowView) -> String {
    format!("{} ({})", file.name, format_size(file.size))
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}
