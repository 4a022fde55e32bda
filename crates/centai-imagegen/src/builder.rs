use std::sync::Arc;

use centai_config::Config;
use centai_history::{FileStorage, HistoryStore};

use crate::{
    error::{GenerationError, Result},
    generator::Generator,
    provider::FalQueueProvider,
};

/// Builder for constructing a [`Generator`] from configuration
pub struct GeneratorBuilder<'a> {
    config: &'a Config,
}

impl<'a> GeneratorBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Create the queue client and open the history file
    ///
    /// Opening history never fails; an unreadable file starts an empty log.
    pub fn build(self) -> Result<Generator> {
        let provider_config = &self.config.provider;

        let poll_interval = provider_config
            .poll_interval()
            .map_err(|e| GenerationError::Config(e.to_string()))?;
        let request_timeout = provider_config
            .request_timeout()
            .map_err(|e| GenerationError::Config(e.to_string()))?;
        let job_timeout = provider_config
            .job_timeout()
            .map_err(|e| GenerationError::Config(e.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| GenerationError::Config(format!("failed to create HTTP client: {e}")))?;

        if provider_config.api_key.is_none() {
            tracing::warn!("no provider API key configured; requests will be sent unauthenticated");
        }

        let provider = FalQueueProvider::new(
            client,
            provider_config.api_key.clone(),
            provider_config.base_url.clone(),
        )
        .with_poll_interval(poll_interval)
        .with_job_timeout(job_timeout);

        let history_config = &self.config.history;
        let history = HistoryStore::open(
            FileStorage::new(&history_config.path),
            history_config.max_entries,
        );

        tracing::debug!(
            base_url = %provider_config.base_url,
            history = %history_config.path.display(),
            entries = history.current().len(),
            "generator initialized"
        );

        Ok(Generator::new(Arc::new(provider), Arc::new(history)))
    }
}
