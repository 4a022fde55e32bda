use serde::{Deserialize, Serialize};

use crate::model::{ImageSize, ModelId};

/// Caller-tunable generation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Remote model to run
    pub model: ModelId,
    /// Output aspect / resolution preset
    pub image_size: ImageSize,
    /// Number of denoising steps
    pub inference_steps: u32,
    /// Fixed seed; the provider picks one when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

impl GenerationOptions {
    /// Options for `model` using its recommended step count
    pub fn for_model(model: ModelId) -> Self {
        Self {
            model,
            image_size: ImageSize::default(),
            inference_steps: model.recommended_steps(),
            seed: None,
        }
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::for_model(ModelId::default())
    }
}

/// A prompt paired with the options it was submitted with
///
/// Only constructible with a non-blank prompt, so holding one means the
/// submission is worth sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    prompt: String,
    options: GenerationOptions,
}

impl GenerationRequest {
    /// Returns `None` when the prompt is empty or only whitespace
    pub fn new(prompt: impl Into<String>, options: GenerationOptions) -> Option<Self> {
        let prompt = prompt.into();

        if prompt.trim().is_empty() {
            return None;
        }

        Some(Self { prompt, options })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }
}
