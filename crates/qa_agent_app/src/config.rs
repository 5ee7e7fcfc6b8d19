//! Command line flags and the optional RON config file.
//!
//! Precedence: command line (including `GEMINI_API_KEY`) over the config
//! file over built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use qa_agent_engine::{EngineConfig, ModelSettings, DEFAULT_BUILD_DELAY};
use serde::Deserialize;

use crate::platform::logging::LogDestination;

const DEFAULT_EXPORT_DIR: &str = "scripts";

#[derive(Debug, Parser)]
#[command(name = "qa-agent")]
#[command(about = "Generate grounded test cases and Selenium scripts from project documents")]
#[command(version)]
pub struct Args {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name, e.g. gemini-3-pro-preview
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL of the generative language API
    #[arg(long)]
    pub base_url: Option<String>,

    /// Directory exported scripts are written to
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// RON config file with the same settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Where log output goes
    #[arg(long, value_enum)]
    pub log_to: Option<LogDestination>,

    /// Duration of the knowledge base build step, in milliseconds
    #[arg(long)]
    pub build_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    export_dir: Option<PathBuf>,
    log_to: Option<LogDestination>,
    build_delay_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    max_response_bytes: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub log_to: LogDestination,
}

impl AppConfig {
    pub fn resolve(args: &Args) -> anyhow::Result<Self> {
        let file = match &args.config {
            Some(path) => load_file_config(path)?,
            None => FileConfig::default(),
        };
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Ok(merge(args, file, &cwd))
    }
}

fn load_file_config(path: &Path) -> anyhow::Result<FileConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    ron::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
}

fn merge(args: &Args, file: FileConfig, cwd: &Path) -> AppConfig {
    let defaults = ModelSettings::default();
    let model = ModelSettings {
        base_url: args
            .base_url
            .clone()
            .or(file.base_url)
            .unwrap_or(defaults.base_url),
        model: args.model.clone().or(file.model).unwrap_or(defaults.model),
        api_key: args.api_key.clone().or(file.api_key),
        request_timeout: file
            .request_timeout_secs
            .map_or(defaults.request_timeout, Duration::from_secs),
        max_response_bytes: file
            .max_response_bytes
            .unwrap_or(defaults.max_response_bytes),
        ..defaults
    };

    let export_dir = args
        .export_dir
        .clone()
        .or(file.export_dir)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR));
    let build_delay = args
        .build_delay_ms
        .or(file.build_delay_ms)
        .map_or(DEFAULT_BUILD_DELAY, Duration::from_millis);

    AppConfig {
        engine: EngineConfig {
            model,
            build_delay,
            export_dir: cwd.join(export_dir),
        },
        log_to: args.log_to.or(file.log_to).unwrap_or_default(),
    }
}
