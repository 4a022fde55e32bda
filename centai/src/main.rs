#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;
mod commands;
mod download;

use std::path::Path;

use args::{Args, Command, DEFAULT_CONFIG};
use centai_config::Config;
use clap::Parser;
use secrecy::SecretString;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (mut config, loaded) = load_config(&args.config)?;

    if let Some(api_key) = args.api_key {
        config.provider.api_key = Some(SecretString::from(api_key));
    }

    centai_telemetry::init(&config.telemetry)?;

    if loaded {
        tracing::debug!(config_path = %args.config.display(), "configuration loaded");
    } else {
        tracing::debug!(config_path = %args.config.display(), "no configuration file, using defaults");
    }

    match args.command {
        Command::Generate(generate) => commands::generate(&config, generate).await?,
        Command::History { limit } => commands::history(&config, limit),
        Command::Models => commands::models(),
    }

    Ok(())
}

/// Load the configuration file
///
/// Only the default file may be absent, in which case built-in defaults
/// apply; a missing file named explicitly is an error.
fn load_config(path: &Path) -> anyhow::Result<(Config, bool)> {
    if !path.exists() && path == Path::new(DEFAULT_CONFIG) {
        return Ok((Config::default(), false));
    }

    Ok((Config::load(path)?, true))
}
