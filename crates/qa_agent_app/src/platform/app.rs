use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use agent_logging::{agent_info, agent_warn};
use anyhow::Context;
use qa_agent_core::{update, AppState, Msg};
use qa_agent_engine::EngineHandle;

use super::effects::EffectRunner;
use super::logging;
use super::ui;
use super::ui::commands::{parse_command, Command};
use crate::config::AppConfig;

const TICK_INTERVAL: Duration = Duration::from_millis(75);

/// What the terminal reader hands to the loop.
enum Input {
    Msg(Msg),
    Show,
    Quit,
}

pub fn run_app(config: AppConfig) -> anyhow::Result<()> {
    logging::initialize(config.log_to);
    agent_info!(
        "Starting qa-agent model={} export_dir={:?}",
        config.engine.model.model,
        config.engine.export_dir
    );
    if config.engine.model.api_key.is_none() {
        agent_warn!("No API key configured");
        eprintln!("Warning: no API key set (--api-key or GEMINI_API_KEY); generation will fail.");
    }

    let engine = EngineHandle::new(config.engine).context("starting engine")?;
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(engine, msg_tx);
    let input_rx = spawn_input_reader();

    let mut app = App {
        state: AppState::new(),
        runner,
    };
    println!("Type `help` for commands.");
    app.render();

    loop {
        match input_rx.recv_timeout(TICK_INTERVAL) {
            Ok(Input::Msg(msg)) => app.dispatch_msg(msg),
            Ok(Input::Show) => app.render(),
            Ok(Input::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => app.dispatch_msg(Msg::Tick),
        }
        while let Ok(msg) = msg_rx.try_recv() {
            app.dispatch_msg(msg);
        }
    }

    agent_info!("qa-agent exiting");
    Ok(())
}

struct App {
    state: AppState,
    runner: EffectRunner,
}

impl App {
    fn dispatch_msg(&mut self, msg: Msg) {
        let (state, effects) = update(std::mem::take(&mut self.state), msg);
        self.state = state;
        self.runner.enqueue(effects);
        if self.state.consume_dirty() {
            self.render();
        }
    }

    fn render(&self) {
        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(ui::render::render(&self.state.view()).as_bytes());
        let _ = stdout.flush();
    }
}

/// Reads commands from stdin on a separate thread. End of input quits.
fn spawn_input_reader() -> mpsc::Receiver<Input> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let input = match parse_command(&line) {
                Ok(None) => continue,
                Ok(Some(Command::Help)) => {
                    println!("{}", ui::commands::HELP);
                    continue;
                }
                Ok(Some(Command::Msg(msg))) => Input::Msg(msg),
                Ok(Some(Command::Show)) => Input::Show,
                Ok(Some(Command::Quit)) => Input::Quit,
                Err(err) => {
                    eprintln!("{err}");
                    continue;
                }
            };
            let quit = matches!(input, Input::Quit);
            if tx.send(input).is_err() || quit {
                return;
            }
        }
        let _ = tx.send(Input::Quit);
    });
    rx
}
