use std::sync::Arc;

use centai_core::{GenerationOptions, GenerationRequest, GenerationResult};
use centai_history::{HistoryEntry, HistoryLog, HistoryStore};
use futures::StreamExt;
use jiff::Timestamp;
use tokio::sync::watch;

use crate::{
    error::{GenerationError, Result},
    event::{JobEvent, ProgressUpdate, QueueStatus},
    normalize::normalize,
    provider::{ImageGenProvider, ProviderInput},
};

/// Observable front-end state owned by the [`Generator`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorState {
    /// Submissions that have started and not yet terminated
    pub in_flight: usize,
    /// Result of the most recent successful submission
    pub current: Option<GenerationResult>,
    /// Message of the most recent failure, cleared by the next success
    pub last_error: Option<String>,
    /// Latest progress update from any running job, cleared when a
    /// submission starts
    ///
    /// Subscribers only see the most recent update; log lines from updates
    /// that arrive between two observations are coalesced away here and
    /// reach only the `centai::provider` log target.
    pub last_progress: Option<ProgressUpdate>,
}

impl GeneratorState {
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }
}

/// Terminal outcome of one [`Generator::submit`] call
#[derive(Debug)]
pub enum Submission {
    /// The prompt was blank; nothing was sent
    Skipped,
    Completed(GenerationResult),
    Failed(GenerationError),
}

/// Drives submissions from prompt to history entry
pub struct Generator {
    provider: Arc<dyn ImageGenProvider>,
    history: Arc<HistoryStore>,
    state: watch::Sender<GeneratorState>,
}

impl Generator {
    pub fn new(provider: Arc<dyn ImageGenProvider>, history: Arc<HistoryStore>) -> Self {
        Self {
            provider,
            history,
            state: watch::Sender::new(GeneratorState::default()),
        }
    }

    /// Run one generation to its terminal outcome
    ///
    /// Failures never propagate: they are logged, recorded in the observable
    /// state and returned as [`Submission::Failed`], leaving the current
    /// result untouched. Submissions may overlap; whichever finishes last
    /// becomes the current result.
    pub async fn submit(&self, prompt: &str, options: GenerationOptions) -> Submission {
        let Some(request) = GenerationRequest::new(prompt, options) else {
            tracing::debug!("blank prompt, nothing submitted");
            return Submission::Skipped;
        };

        let submitted_at = Timestamp::now();
        let _in_flight = InFlight::enter(&self.state);

        match self.run(&request).await {
            Ok(result) => {
                tracing::info!(url = %result, model = %options.model, "image generated");

                self.history
                    .append(HistoryEntry::new(&request, result.clone(), submitted_at));

                self.state.send_modify(|state| {
                    state.current = Some(result.clone());
                    state.last_error = None;
                });

                Submission::Completed(result)
            }
            Err(e) => {
                tracing::error!(error = %e, model = %options.model, "image generation failed");

                self.state.send_modify(|state| state.last_error = Some(e.to_string()));

                Submission::Failed(e)
            }
        }
    }

    async fn run(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let model = request.options().model;
        let input = ProviderInput::from_request(request);

        tracing::debug!(
            provider = %self.provider.name(),
            model = %model,
            image_size = %input.image_size,
            steps = input.num_inference_steps,
            "submitting generation"
        );

        let mut events = self.provider.submit(model, &input).await?;

        while let Some(event) = events.next().await {
            match event? {
                JobEvent::Progress(update) => self.record_progress(update),
                JobEvent::Completed(payload) => return normalize(payload),
            }
        }

        Err(GenerationError::provider("job ended without a result"))
    }

    fn record_progress(&self, update: ProgressUpdate) {
        match update.status {
            QueueStatus::Queued => {
                tracing::debug!(queue_position = ?update.queue_position, "job queued");
            }
            QueueStatus::InProgress => {
                for line in &update.logs {
                    tracing::info!(target: "centai::provider", "{line}");
                }
            }
            QueueStatus::Completed => tracing::debug!("job completed"),
        }

        self.state.send_modify(|state| state.last_progress = Some(update));
    }

    /// Snapshot of the observable state
    pub fn state(&self) -> GeneratorState {
        self.state.borrow().clone()
    }

    /// Receive every change to the observable state
    pub fn subscribe(&self) -> watch::Receiver<GeneratorState> {
        self.state.subscribe()
    }

    /// Persisted generations, newest first
    pub fn history(&self) -> HistoryLog {
        self.history.current()
    }
}

/// Holds the in-flight count up for one submission, even if its future is dropped
struct InFlight<'a>(&'a watch::Sender<GeneratorState>);

impl<'a> InFlight<'a> {
    fn enter(state: &'a watch::Sender<GeneratorState>) -> Self {
        state.send_modify(|state| {
            state.in_flight += 1;
            state.last_progress = None;
        });
        Self(state)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0
            .send_modify(|state| state.in_flight = state.in_flight.saturating_sub(1));
    }
}
