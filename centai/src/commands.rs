use anyhow::Context;
use centai_config::Config;
use centai_core::{ImageSize, ModelId};
use centai_history::{FileStorage, HistoryStore};
use centai_imagegen::{ProgressUpdate, QueueStatus, Submission};
use jiff::Timestamp;
use strum::IntoEnumIterator;

use crate::{args::GenerateArgs, download};

/// Run one generation and print the resulting URL to stdout
pub async fn generate(config: &Config, args: GenerateArgs) -> anyhow::Result<()> {
    let generator = centai_imagegen::build_generator(config)?;
    let options = args.options(&config.defaults);

    let mut updates = generator.subscribe();
    let reporter = tokio::spawn(async move {
        let mut last_position = None;

        while updates.changed().await.is_ok() {
            let progress = updates.borrow_and_update().last_progress.clone();

            if let Some(ProgressUpdate {
                status: QueueStatus::Queued,
                queue_position: Some(position),
                ..
            }) = progress
                && last_position != Some(position)
            {
                eprintln!("queued at position {position}");
                last_position = Some(position);
            }
        }
    });

    let submission = generator.submit(&args.prompt, options).await;
    reporter.abort();

    let result = match submission {
        Submission::Skipped => {
            eprintln!("prompt is empty, nothing to generate");
            return Ok(());
        }
        Submission::Completed(result) => result,
        Submission::Failed(e) => return Err(e).context("image generation failed"),
    };

    println!("{result}");

    if let Some(output) = args.output {
        let path = output.unwrap_or_else(|| download::default_file_name(Timestamp::now()));
        download::save(&reqwest::Client::new(), result.url(), &path).await?;
        eprintln!("saved {}", path.display());
    }

    Ok(())
}

/// Print stored generations, newest first
pub fn history(config: &Config, limit: Option<usize>) {
    let store = HistoryStore::open(FileStorage::new(&config.history.path), config.history.max_entries);
    let log = store.current();

    if log.is_empty() {
        eprintln!("no generations yet");
        return;
    }

    for entry in log.iter().take(limit.unwrap_or(usize::MAX)) {
        let options = &entry.options;
        let seed = options.seed.map(|seed| format!(" seed {seed}")).unwrap_or_default();

        println!(
            "{}  {} ({}, {} steps{seed})",
            entry.submitted_at,
            options.model.label(),
            options.image_size.label(),
            options.inference_steps,
        );
        println!("    {}", entry.prompt);
        println!("    {}", entry.result);
    }
}

/// Print the model and image size catalogues
pub fn models() {
    println!("Models:");
    for model in ModelId::iter() {
        println!(
            "  {:<28} {:<20} {:>2} steps  {}",
            model.as_ref(),
            model.label(),
            model.recommended_steps(),
            model.note(),
        );
    }

    println!("Image sizes:");
    for size in ImageSize::iter() {
        println!("  {:<28} {}", size.as_ref(), size.label());
    }
}
