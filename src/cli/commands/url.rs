//! URL command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::resolver::validate_url;
use anyhow::Result;

/// Run the url command.
pub async fn run_url(url: &str, settings: Settings) -> Result<()> {
    let url = match validate_url(url) {
        Ok(u) => u,
        Err(e) => {
            Output::error(&e.to_string());
            return Err(e.into());
        }
    };

    if let Err(e) = preflight::check(Operation::Resolve) {
        Output::error(&e.to_string());
        Output::info("Run 'tunegrab doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings).await?;

    let spinner = Output::spinner("Analyzing...");
    let video = orchestrator.resolver().resolve_by_url(url).await;
    spinner.finish_and_clear();

    let Some(video) = video else {
        Output::error("Could not load the details for this video.");
        return Err(anyhow::anyhow!("video details unavailable for {}", url));
    };

    Output::header("Video found");
    println!();
    let processing = orchestrator.tracker().is_processing(&video.id);
    Output::video(None, &video, processing);
    println!();
    Output::kv("ID", &video.id);
    Output::kv("Thumbnail", &video.thumbnail);

    Ok(())
}
