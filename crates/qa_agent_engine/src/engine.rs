use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use agent_logging::{agent_debug, agent_error, agent_info};
use qa_agent_core::{FileRole, RequestToken, TestCase, UploadedFile};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::adapter::QaAdapter;
use crate::export::ScriptExporter;
use crate::gemini::{GeminiClient, ModelClient, ModelSettings};
use crate::intake::read_files;
use crate::{EngineEvent, GenerationError};

/// How long "Build Knowledge Base" shows its progress state.
pub const DEFAULT_BUILD_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub model: ModelSettings,
    pub build_delay: Duration,
    pub export_dir: PathBuf,
}

impl EngineConfig {
    pub fn default_with_export_dir(export_dir: PathBuf) -> Self {
        Self {
            model: ModelSettings::default(),
            build_delay: DEFAULT_BUILD_DELAY,
            export_dir,
        }
    }
}

enum EngineCommand {
    ReadFiles {
        role: FileRole,
        paths: Vec<PathBuf>,
    },
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
    Cancel {
        token: RequestToken,
    },
    ExportScript {
        file_name: String,
        code: String,
    },
}

/// Handle to the background engine thread. Commands go in, `EngineEvent`s
/// come out; dropping every handle stops the thread and its runtime.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, GenerationError> {
        let client = GeminiClient::new(config.model.clone())?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    pub fn with_client(config: EngineConfig, client: Arc<dyn ModelClient>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let worker = Worker {
            adapter: QaAdapter::new(client),
            exporter: ScriptExporter::new(config.export_dir),
            build_delay: config.build_delay,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            event_tx,
        };

        thread::spawn(move || {
            let runtime = match Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    agent_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                worker.dispatch(&runtime, command);
            }
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    pub fn read_files(&self, role: FileRole, paths: Vec<PathBuf>) {
        self.send(EngineCommand::ReadFiles { role, paths });
    }

    pub fn build_knowledge_base(&self) {
        self.send(EngineCommand::BuildKnowledgeBase);
    }

    pub fn generate_test_cases(
        &self,
        token: RequestToken,
        prompt: impl Into<String>,
        files: Vec<UploadedFile>,
    ) {
        self.send(EngineCommand::GenerateTestCases {
            token,
            prompt: prompt.into(),
            files,
        });
    }

    pub fn generate_script(
        &self,
        token: RequestToken,
        test_case: TestCase,
        files: Vec<UploadedFile>,
    ) {
        self.send(EngineCommand::GenerateScript {
            token,
            test_case,
            files,
        });
    }

    /// Aborts the request tagged `token`. No event is emitted for it.
    pub fn cancel(&self, token: RequestToken) {
        self.send(EngineCommand::Cancel { token });
    }

    pub fn export_script(&self, file_name: impl Into<String>, code: impl Into<String>) {
        self.send(EngineCommand::ExportScript {
            file_name: file_name.into(),
            code: code.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            agent_error!("Engine thread is gone; command dropped");
        }
    }
}

type InFlight = Arc<Mutex<HashMap<RequestToken, CancellationToken>>>;

struct Worker {
    adapter: QaAdapter,
    exporter: ScriptExporter,
    build_delay: Duration,
    in_flight: InFlight,
    event_tx: mpsc::Sender<EngineEvent>,
}

impl Worker {
    fn dispatch(&self, runtime: &Runtime, command: EngineCommand) {
        match command {
            EngineCommand::ReadFiles { role, paths } => {
                let event_tx = self.event_tx.clone();
                runtime.spawn(async move {
                    let result = read_files(role, &paths).await;
                    let _ = event_tx.send(EngineEvent::FilesLoaded { role, result });
                });
            }
            EngineCommand::BuildKnowledgeBase => {
                let delay = self.build_delay;
                let event_tx = self.event_tx.clone();
                runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = event_tx.send(EngineEvent::KnowledgeBaseReady);
                });
            }
            EngineCommand::GenerateTestCases {
                token,
                prompt,
                files,
            } => {
                let adapter = self.adapter.clone();
                self.spawn_generation(runtime, token, async move {
                    let result = adapter.generate_test_cases(&prompt, &files).await;
                    EngineEvent::TestCasesGenerated { token, result }
                });
            }
            EngineCommand::GenerateScript {
                token,
                test_case,
                files,
            } => {
                let adapter = self.adapter.clone();
                self.spawn_generation(runtime, token, async move {
                    let result = adapter.generate_selenium_script(&test_case, &files).await;
                    EngineEvent::ScriptGenerated { token, result }
                });
            }
            EngineCommand::Cancel { token } => {
                let cancelled = lock_in_flight(&self.in_flight).remove(&token);
                match cancelled {
                    Some(cancel) => {
                        agent_info!("Cancelling request {}", token);
                        cancel.cancel();
                    }
                    None => agent_debug!("Request {} already finished", token),
                }
            }
            EngineCommand::ExportScript { file_name, code } => {
                let exporter = self.exporter.clone();
                let event_tx = self.event_tx.clone();
                runtime.spawn_blocking(move || {
                    let result = exporter.export(&file_name, &code);
                    let _ = event_tx.send(EngineEvent::ScriptExported { result });
                });
            }
        }
    }

    /// Runs `work` as a cancellable task registered under `token`.
    fn spawn_generation<F>(&self, runtime: &Runtime, token: RequestToken, work: F)
    where
        F: Future<Output = EngineEvent> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        lock_in_flight(&self.in_flight).insert(token, cancel.clone());

        let in_flight = self.in_flight.clone();
        let event_tx = self.event_tx.clone();
        runtime.spawn(async move {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => None,
                event = work => Some(event),
            };
            lock_in_flight(&in_flight).remove(&token);
            match outcome {
                Some(event) => {
                    let _ = event_tx.send(event);
                }
                None => agent_debug!("Request {} dropped after cancellation", token),
            }
        });
    }
}

fn lock_in_flight(
    in_flight: &InFlight,
) -> std::sync::MutexGuard<'_, HashMap<RequestToken, CancellationToken>> {
    // The map stays consistent even if a holder panicked.
    in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
