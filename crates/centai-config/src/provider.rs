use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

/// Public fal.ai queue endpoint
pub const DEFAULT_BASE_URL: &str = "https://queue.fal.run";

/// Inference provider connection settings
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Static credential sent as `Authorization: Key ...`
    ///
    /// When unset no header is sent and the provider's auth failure surfaces
    /// as an ordinary request error.
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Queue base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Delay between job status polls (e.g. "500ms")
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,
    /// Timeout for each individual HTTP call to the queue (e.g. "60s")
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,
    /// Overall limit for one job from enqueue to result (e.g. "5m"); unset
    /// means a job may wait in the queue indefinitely
    #[serde(default)]
    pub job_timeout: Option<String>,
}

impl ProviderConfig {
    /// Parsed [`Self::poll_interval`]
    pub fn poll_interval(&self) -> anyhow::Result<Duration> {
        parse_duration("provider.poll_interval", &self.poll_interval)
    }

    /// Parsed [`Self::request_timeout`]
    pub fn request_timeout(&self) -> anyhow::Result<Duration> {
        parse_duration("provider.request_timeout", &self.request_timeout)
    }

    /// Parsed [`Self::job_timeout`], if set
    pub fn job_timeout(&self) -> anyhow::Result<Option<Duration>> {
        self.job_timeout
            .as_deref()
            .map(|value| parse_duration("provider.job_timeout", value))
            .transpose()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            poll_interval: default_poll_interval(),
            request_timeout: default_request_timeout(),
            job_timeout: None,
        }
    }
}

fn parse_duration(field: &str, value: &str) -> anyhow::Result<Duration> {
    duration_str::parse(value).map_err(|e| anyhow::anyhow!("invalid duration for {field} '{value}': {e}"))
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_poll_interval() -> String {
    "500ms".to_owned()
}

fn default_request_timeout() -> String {
    "60s".to_owned()
}
