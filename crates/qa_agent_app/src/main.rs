mod config;
mod platform;

use clap::Parser;

use crate::config::{AppConfig, Args};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AppConfig::resolve(&args)?;
    platform::run_app(config)
}
