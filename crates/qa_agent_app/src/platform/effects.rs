use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use agent_logging::{agent_debug, agent_info, agent_warn};
use qa_agent_core::{Effect, Msg};
use qa_agent_engine::{EngineEvent, EngineHandle};

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Forwards effects to the engine and engine events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, msg_tx: mpsc::Sender<Msg>) -> Self {
        let runner = Self { engine };
        runner.spawn_event_loop(msg_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ReadFiles { role, paths } => {
                    agent_debug!("ReadFiles role={} count={}", role, paths.len());
                    self.engine.read_files(role, paths);
                }
                Effect::BuildKnowledgeBase => self.engine.build_knowledge_base(),
                Effect::GenerateTestCases {
                    token,
                    prompt,
                    files,
                } => {
                    agent_info!(
                        "GenerateTestCases token={} files={} prompt_chars={}",
                        token,
                        files.len(),
                        prompt.len()
                    );
                    self.engine.generate_test_cases(token, prompt, files);
                }
                Effect::GenerateScript {
                    token,
                    test_case,
                    files,
                } => {
                    agent_info!("GenerateScript token={} test_id={}", token, test_case.test_id);
                    self.engine.generate_script(token, test_case, files);
                }
                Effect::CancelGeneration { token } => self.engine.cancel(token),
                Effect::ExportScript { file_name, code } => {
                    self.engine.export_script(file_name, code);
                }
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.try_recv() {
                if msg_tx.send(event_to_msg(event)).is_err() {
                    break;
                }
            } else {
                thread::sleep(EVENT_POLL_INTERVAL);
            }
        });
    }
}

/// Failure causes are logged here; the state only learns that a call failed.
fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::FilesLoaded { role, result } => match result {
            Ok(files) => Msg::FilesLoaded { files },
            Err(err) => {
                agent_warn!("Adding {} files failed: {}", role, err);
                Msg::IntakeFailed {
                    message: err.to_string(),
                }
            }
        },
        EngineEvent::KnowledgeBaseReady => Msg::KnowledgeBaseReady,
        EngineEvent::TestCasesGenerated { token, result } => match result {
            Ok(test_cases) => Msg::TestCasesGenerated { token, test_cases },
            Err(err) => {
                agent_warn!("Test case request {} failed: {}", token, err);
                Msg::TestCasesFailed { token }
            }
        },
        EngineEvent::ScriptGenerated { token, result } => match result {
            Ok(code) => Msg::ScriptGenerated { token, code },
            Err(err) => {
                agent_warn!("Script request {} failed: {}", token, err);
                Msg::ScriptFailed { token }
            }
        },
        EngineEvent::ScriptExported { result } => match result {
            Ok(path) => Msg::ScriptExported { path },
            Err(err) => {
                agent_warn!("Export failed: {}", err);
                Msg::ExportFailed {
                    message: err.to_string(),
                }
            }
        },
    }
}
