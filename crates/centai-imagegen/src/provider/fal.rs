use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use centai_core::ModelId;
use futures::stream;
use reqwest::{Client, RequestBuilder, Response, header::AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::time::Instant;

use super::{ImageGenProvider, JobStream, ProviderInput};
use crate::{
    error::{GenerationError, Result},
    event::{JobEvent, ProgressUpdate},
};

/// Delay between status polls when none is configured
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// fal.ai queue provider
///
/// A job is enqueued with one POST, its status is polled until the queue
/// reports completion, then the result payload is fetched.
pub struct FalQueueProvider {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
    poll_interval: Duration,
    job_timeout: Option<Duration>,
}

impl FalQueueProvider {
    /// Create a provider talking to the queue at `base_url`
    pub fn new(client: Client, api_key: Option<SecretString>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            job_timeout: None,
        }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Give up on a job that has not finished this long after enqueueing
    #[must_use]
    pub fn with_job_timeout(mut self, job_timeout: Option<Duration>) -> Self {
        self.job_timeout = job_timeout;
        self
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Wire format of the enqueue response
#[derive(Deserialize)]
struct QueueSubmitResponse {
    request_id: String,
    #[serde(default)]
    status_url: Option<String>,
    #[serde(default)]
    response_url: Option<String>,
}

/// Wire format of a status poll
#[derive(Deserialize)]
struct QueueStatusResponse {
    status: WireStatus,
    #[serde(default)]
    queue_position: Option<u32>,
    #[serde(default)]
    logs: Option<Vec<QueueLog>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum WireStatus {
    InQueue,
    InProgress,
    Completed,
}

#[derive(Deserialize)]
struct QueueLog {
    message: String,
}

#[async_trait]
impl ImageGenProvider for FalQueueProvider {
    async fn submit(&self, model: ModelId, input: &ProviderInput) -> Result<JobStream> {
        let started = Instant::now();
        let url = format!("{}/{model}", self.base());

        tracing::debug!(provider = %self.name(), model = %model, "submitting generation job");

        let response = authorize(self.client.post(&url), self.api_key.as_ref())
            .json(input)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(provider = %self.name(), error = %e, "job submission failed");
                GenerationError::Connection(format!("failed to submit job to {url}: {e}"))
            })?;

        let submitted: QueueSubmitResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| GenerationError::provider(format!("malformed queue submit response: {e}")))?;

        tracing::debug!(
            provider = %self.name(),
            request_id = %submitted.request_id,
            "job enqueued"
        );

        // Status and result live under the app id, not the full model path
        let request_base = format!("{}/{}/requests/{}", self.base(), model.app_id(), submitted.request_id);

        let job = QueueJob {
            client: self.client.clone(),
            api_key: self.api_key.clone(),
            status_url: submitted.status_url.unwrap_or_else(|| format!("{request_base}/status")),
            response_url: submitted.response_url.unwrap_or(request_base),
            request_id: submitted.request_id,
            poll_interval: self.poll_interval,
            deadline: self.job_timeout.map(|timeout| (started + timeout, timeout)),
        };

        Ok(job.into_stream())
    }

    fn name(&self) -> &str {
        "fal"
    }
}

/// A single enqueued job being driven to completion
struct QueueJob {
    client: Client,
    api_key: Option<SecretString>,
    request_id: String,
    status_url: String,
    response_url: String,
    poll_interval: Duration,
    /// When to stop polling, with the timeout it was derived from
    deadline: Option<(Instant, Duration)>,
}

/// Where the job stream is in its lifecycle
enum Step {
    /// Poll status; `logs_seen` lines were already emitted
    Poll { logs_seen: usize, wait: bool },
    /// Queue reported completion; fetch the payload
    Fetch,
    Done,
}

impl QueueJob {
    fn into_stream(self) -> JobStream {
        let job = Arc::new(self);
        let start = Step::Poll {
            logs_seen: 0,
            wait: false,
        };

        Box::pin(stream::unfold(start, move |step| {
            let job = Arc::clone(&job);
            async move { job.advance(step).await }
        }))
    }

    async fn advance(&self, step: Step) -> Option<(Result<JobEvent>, Step)> {
        match step {
            Step::Done => None,
            Step::Fetch => Some((self.fetch_result().await.map(JobEvent::Completed), Step::Done)),
            Step::Poll { logs_seen, wait } => {
                if wait {
                    tokio::time::sleep(self.poll_interval).await;
                }

                if let Err(e) = self.check_deadline() {
                    return Some((Err(e), Step::Done));
                }

                match self.poll_status().await {
                    Ok(status) => Some(Self::progress(status, logs_seen)),
                    Err(e) => Some((Err(e), Step::Done)),
                }
            }
        }
    }

    fn check_deadline(&self) -> Result<()> {
        match self.deadline {
            Some((deadline, timeout)) if Instant::now() >= deadline => {
                tracing::warn!(request_id = %self.request_id, ?timeout, "job timed out");

                Err(GenerationError::JobTimedOut {
                    request_id: self.request_id.clone(),
                    timeout,
                })
            }
            _ => Ok(()),
        }
    }

    /// Translate a status poll into a progress event and the next step
    ///
    /// The queue returns every log line so far on each poll; only lines past
    /// `logs_seen` are forwarded.
    fn progress(status: QueueStatusResponse, logs_seen: usize) -> (Result<JobEvent>, Step) {
        match status.status {
            WireStatus::InQueue => (
                Ok(JobEvent::Progress(ProgressUpdate::queued(status.queue_position))),
                Step::Poll { logs_seen, wait: true },
            ),
            WireStatus::InProgress => {
                let logs = status.logs.unwrap_or_default();
                let total = logs.len().max(logs_seen);
                let fresh = logs.into_iter().skip(logs_seen).map(|log| log.message).collect();

                (
                    Ok(JobEvent::Progress(ProgressUpdate::in_progress(fresh))),
                    Step::Poll {
                        logs_seen: total,
                        wait: true,
                    },
                )
            }
            WireStatus::Completed => match status.error {
                Some(error) => (Err(GenerationError::provider(error)), Step::Done),
                None => (Ok(JobEvent::Progress(ProgressUpdate::completed())), Step::Fetch),
            },
        }
    }

    async fn poll_status(&self) -> Result<QueueStatusResponse> {
        let response = authorize(self.client.get(&self.status_url), self.api_key.as_ref())
            .query(&[("logs", "1")])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(request_id = %self.request_id, error = %e, "status poll failed");
                GenerationError::Connection(format!("failed to poll job {}: {e}", self.request_id))
            })?;

        check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| GenerationError::provider(format!("malformed queue status response: {e}")))
    }

    async fn fetch_result(&self) -> Result<serde_json::Value> {
        let response = authorize(self.client.get(&self.response_url), self.api_key.as_ref())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(request_id = %self.request_id, error = %e, "result fetch failed");
                GenerationError::Connection(format!("failed to fetch result of job {}: {e}", self.request_id))
            })?;

        let payload = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| GenerationError::provider(format!("result of job {} is not JSON: {e}", self.request_id)))?;

        tracing::debug!(request_id = %self.request_id, "job result fetched");

        Ok(payload)
    }
}

fn authorize(builder: RequestBuilder, api_key: Option<&SecretString>) -> RequestBuilder {
    match api_key {
        Some(key) => builder.header(AUTHORIZATION, format!("Key {}", key.expose_secret())),
        None => builder,
    }
}

/// Map a non-2xx queue response to an error
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    tracing::error!(status = %status, "provider queue returned an error");

    Err(match status.as_u16() {
        401 | 403 => GenerationError::AuthenticationFailed(message),
        code => GenerationError::ProviderRequestFailed {
            status: Some(code),
            message,
        },
    })
}
