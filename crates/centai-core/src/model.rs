use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Remote text-to-image models available on the provider queue
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
pub enum ModelId {
    /// SDXL distilled for few-step sampling
    #[default]
    #[serde(rename = "fal-ai/fast-lightning-sdxl")]
    #[strum(serialize = "fal-ai/fast-lightning-sdxl")]
    FastLightningSdxl,
    /// FLUX.1 schnell
    #[serde(rename = "fal-ai/flux/schnell")]
    #[strum(serialize = "fal-ai/flux/schnell")]
    FluxSchnell,
    /// FLUX.1 dev
    #[serde(rename = "fal-ai/flux/dev")]
    #[strum(serialize = "fal-ai/flux/dev")]
    FluxDev,
}

impl ModelId {
    /// Human-readable name
    pub fn label(self) -> &'static str {
        match self {
            Self::FastLightningSdxl => "Fast Lightning SDXL",
            Self::FluxSchnell => "FLUX.1 [schnell]",
            Self::FluxDev => "FLUX.1 [dev]",
        }
    }

    /// Advisory step count; never enforced
    pub fn recommended_steps(self) -> u32 {
        match self {
            Self::FastLightningSdxl | Self::FluxSchnell => 4,
            Self::FluxDev => 28,
        }
    }

    pub fn note(self) -> &'static str {
        match self {
            Self::FastLightningSdxl => "Best balance of speed and quality",
            Self::FluxSchnell => "Optimized for speed, good for rapid prototyping",
            Self::FluxDev => "Latest experimental features",
        }
    }

    /// Queue application id: the first two path segments of the model id
    ///
    /// Request status and result endpoints live under the application, not
    /// the full model path (`fal-ai/flux/dev` polls under `fal-ai/flux`).
    pub fn app_id(self) -> &'static str {
        let id: &'static str = self.into();

        match id.match_indices('/').nth(1) {
            Some((idx, _)) => &id[..idx],
            None => id,
        }
    }
}

/// Aspect ratio / resolution presets understood by the provider
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ImageSize {
    #[default]
    SquareHd,
    Square,
    #[serde(rename = "portrait_4_3")]
    #[strum(serialize = "portrait_4_3")]
    Portrait4x3,
    #[serde(rename = "portrait_16_9")]
    #[strum(serialize = "portrait_16_9")]
    Portrait16x9,
    #[serde(rename = "landscape_4_3")]
    #[strum(serialize = "landscape_4_3")]
    Landscape4x3,
    #[serde(rename = "landscape_16_9")]
    #[strum(serialize = "landscape_16_9")]
    Landscape16x9,
}

impl ImageSize {
    pub fn label(self) -> &'static str {
        match self {
            Self::SquareHd => "Square HD",
            Self::Square => "Square",
            Self::Portrait4x3 => "Portrait (4:3)",
            Self::Portrait16x9 => "Portrait (16:9)",
            Self::Landscape4x3 => "Landscape (4:3)",
            Self::Landscape16x9 => "Landscape (16:9)",
        }
    }
}
