#![allow(clippy::must_use_candidate)]

//! Request and result types shared by the CentAI crates

mod model;
mod options;
mod result;

pub use model::{ImageSize, ModelId};
pub use options::{GenerationOptions, GenerationRequest};
pub use result::GenerationResult;
