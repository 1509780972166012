//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::resolver::validate_query;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, settings: Settings) -> Result<()> {
    let query = match validate_query(query) {
        Ok(q) => q,
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

    let spinner = Output::spinner("Searching...");
    let results = orchestrator.resolver().resolve_by_query(query).await;
    spinner.finish_and_clear();

    if results.is_empty() {
        Output::warning("No videos found. Try a different search.");
        return Ok(());
    }

    Output::header(&format!("Results for \"{}\"", query));
    println!();
    for (i, video) in results.iter().enumerate() {
        let processing = orchestrator.tracker().is_processing(&video.id);
        Output::video(Some(i + 1), video, processing);
    }
    println!();
    Output::info(&format!(
        "Convert one with: tunegrab convert \"{}\" --pick <n>",
        query
    ));

    Ok(())
}
