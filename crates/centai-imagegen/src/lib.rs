#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod builder;
mod error;
mod event;
mod generator;
mod normalize;
pub mod provider;

pub use builder::GeneratorBuilder;
pub use error::{GenerationError, Result};
pub use event::{JobEvent, ProgressUpdate, QueueStatus};
pub use generator::{Generator, GeneratorState, Submission};
pub use normalize::normalize;
pub use provider::{FalQueueProvider, ImageGenProvider, JobStream, ProviderInput};

/// Build a [`Generator`] from configuration
pub fn build_generator(config: &centai_config::Config) -> Result<Generator> {
    GeneratorBuilder::new(config).build()
}
