use std::path::PathBuf;

use centai_config::DefaultsConfig;
use centai_core::{GenerationOptions, ImageSize, ModelId};
use clap::{Parser, Subcommand};

/// Configuration file read when `--config` is not given
pub const DEFAULT_CONFIG: &str = "centai.toml";

/// CentAI image generator
#[derive(Debug, Parser)]
#[command(name = "centai", version, about = "Generate images from text prompts on the fal.ai queue")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG, env = "CENTAI_CONFIG")]
    pub config: PathBuf,

    /// Provider API key, overriding the configured one
    #[arg(long, env = "FAL_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate an image and print its URL
    Generate(GenerateArgs),
    /// List past generations, newest first
    History {
        /// Show at most this many entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// List the available models and image sizes
    Models,
}

#[derive(Debug, clap::Args)]
pub struct GenerateArgs {
    /// Text description of the image
    pub prompt: String,

    /// Model id, e.g. "fal-ai/flux/schnell"
    #[arg(short, long)]
    pub model: Option<ModelId>,

    /// Size preset, e.g. "landscape_16_9"
    #[arg(short, long)]
    pub size: Option<ImageSize>,

    /// Denoising steps; defaults to the model's recommendation
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub steps: Option<u32>,

    /// Fixed seed for reproducible output
    #[arg(long, allow_negative_numbers = true)]
    pub seed: Option<i64>,

    /// Download the image; without a value a timestamped file name is used
    #[arg(short, long)]
    pub output: Option<Option<PathBuf>>,
}

impl GenerateArgs {
    /// Layer command-line choices over the configured defaults
    ///
    /// Picking a model on the command line also picks its recommended step
    /// count unless `--steps` is given.
    pub fn options(&self, defaults: &DefaultsConfig) -> GenerationOptions {
        let mut options = match self.model {
            Some(model) => GenerationOptions {
                image_size: defaults.image_size,
                ..GenerationOptions::for_model(model)
            },
            None => defaults.options(),
        };

        if let Some(size) = self.size {
            options.image_size = size;
        }
        if let Some(steps) = self.steps {
            options.inference_steps = steps;
        }
        options.seed = self.seed;

        options
    }
}
