//! Programmatic configuration builder for integration tests

use std::path::{Path, PathBuf};

use centai_config::{Config, DefaultsConfig, HistoryConfig, ProviderConfig, TelemetryConfig};
use secrecy::SecretString;

use super::mock_fal::TEST_KEY;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Point the provider at `base_url` with the mock's key and fast polling
    pub fn new(base_url: &str, history_dir: &Path) -> Self {
        Self {
            config: Config {
                provider: ProviderConfig {
                    api_key: Some(SecretString::from(TEST_KEY)),
                    base_url: base_url.to_owned(),
                    poll_interval: "1ms".to_owned(),
                    request_timeout: "5s".to_owned(),
                    job_timeout: None,
                },
                defaults: DefaultsConfig::default(),
                history: HistoryConfig {
                    path: history_path(history_dir),
                    ..HistoryConfig::default()
                },
                telemetry: TelemetryConfig::default(),
            },
        }
    }

    /// Send no credential at all
    pub fn without_api_key(mut self) -> Self {
        self.config.provider.api_key = None;
        self
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.config.provider.api_key = Some(SecretString::from(key));
        self
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.config.history.max_entries = max_entries;
        self
    }

    pub fn with_job_timeout(mut self, job_timeout: &str) -> Self {
        self.config.provider.job_timeout = Some(job_timeout.to_owned());
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}

/// Location of the history file inside a test directory
pub fn history_path(dir: &Path) -> PathBuf {
    dir.join("image_history.json")
}
