use std::path::Path;

use crate::Config;

/// Steps above this are rejected outright; the provider caps well below it
const MAX_INFERENCE_STEPS: u32 = 100;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or [`Config::parse`] fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// Expands `{{ env.VAR }}` placeholders, deserializes, then validates.
    ///
    /// # Errors
    ///
    /// Returns an error if variable expansion, TOML parsing, or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is usable
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_provider()?;
        self.validate_defaults()?;
        self.validate_history()?;
        Ok(())
    }

    fn validate_provider(&self) -> anyhow::Result<()> {
        let base_url = url::Url::parse(&self.provider.base_url)
            .map_err(|e| anyhow::anyhow!("provider.base_url '{}' is not a valid URL: {e}", self.provider.base_url))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            anyhow::bail!("provider.base_url must use http or https");
        }

        if self.provider.poll_interval()?.is_zero() {
            anyhow::bail!("provider.poll_interval must be greater than 0");
        }

        if self.provider.request_timeout()?.is_zero() {
            anyhow::bail!("provider.request_timeout must be greater than 0");
        }

        if self.provider.job_timeout()?.is_some_and(|timeout| timeout.is_zero()) {
            anyhow::bail!("provider.job_timeout must be greater than 0");
        }

        Ok(())
    }

    fn validate_defaults(&self) -> anyhow::Result<()> {
        if let Some(steps) = self.defaults.inference_steps
            && !(1..=MAX_INFERENCE_STEPS).contains(&steps)
        {
            anyhow::bail!("defaults.inference_steps must be between 1 and {MAX_INFERENCE_STEPS}, got {steps}");
        }

        Ok(())
    }

    fn validate_history(&self) -> anyhow::Result<()> {
        if self.history.max_entries == 0 {
            anyhow::bail!("history.max_entries must be at least 1");
        }

        if self.history.path.as_os_str().is_empty() {
            anyhow::bail!("history.path must not be empty");
        }

        Ok(())
    }
}
