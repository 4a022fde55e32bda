use centai_core::{GenerationOptions, ImageSize, ModelId};
use serde::Deserialize;

/// Options applied when the caller does not pick their own
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    /// Model to run
    #[serde(default)]
    pub model: ModelId,
    /// Output size preset
    #[serde(default)]
    pub image_size: ImageSize,
    /// Step count; falls back to the model's recommendation
    #[serde(default)]
    pub inference_steps: Option<u32>,
}

impl DefaultsConfig {
    /// Generation options with these defaults filled in
    pub fn options(&self) -> GenerationOptions {
        GenerationOptions {
            model: self.model,
            image_size: self.image_size,
            inference_steps: self.inference_steps.unwrap_or_else(|| self.model.recommended_steps()),
            seed: None,
        }
    }
}
