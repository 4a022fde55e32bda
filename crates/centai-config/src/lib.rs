#![allow(clippy::must_use_candidate)]

pub mod defaults;
mod env;
pub mod history;
mod loader;
pub mod provider;
pub mod telemetry;

use serde::Deserialize;

pub use defaults::*;
pub use history::*;
pub use provider::*;
pub use telemetry::{LogFormat, TelemetryConfig};

/// Top-level CentAI configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Inference provider connection
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Default generation options
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// History persistence
    #[serde(default)]
    pub history: HistoryConfig,
    /// Logging
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
