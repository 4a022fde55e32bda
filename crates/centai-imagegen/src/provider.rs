pub(crate) mod fal;

use std::pin::Pin;

use async_trait::async_trait;
use centai_core::{GenerationRequest, ImageSize, ModelId};
use futures::Stream;
use serde::Serialize;

use crate::{error::Result, event::JobEvent};

pub use fal::FalQueueProvider;

/// Finite, non-restartable stream of a single job's events
pub type JobStream = Pin<Box<dyn Stream<Item = Result<JobEvent>> + Send>>;

/// Request body sent to the provider for one job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderInput {
    pub prompt: String,
    pub image_size: ImageSize,
    pub num_inference_steps: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    pub enable_safety_checker: bool,
}

impl ProviderInput {
    /// Copy the request's fields verbatim; the safety checker is always off
    pub fn from_request(request: &GenerationRequest) -> Self {
        let options = request.options();

        Self {
            prompt: request.prompt().to_owned(),
            image_size: options.image_size,
            num_inference_steps: options.inference_steps,
            seed: options.seed,
            enable_safety_checker: false,
        }
    }
}

/// A remote image generation backend
#[async_trait]
pub trait ImageGenProvider: Send + Sync {
    /// Enqueue a job and return its event stream
    ///
    /// Failing to enqueue is reported here; failures after that arrive as
    /// the stream's terminal item.
    async fn submit(&self, model: ModelId, input: &ProviderInput) -> Result<JobStream>;

    /// Get the provider name
    fn name(&self) -> &str;
}
