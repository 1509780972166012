//! Convert command implementation.
//!
//! Resolves the input (a YouTube URL or a search query), starts one job per
//! selected video and follows every job until it finishes.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::conversion::{JobId, JobStatus, JobTracker};
use crate::orchestrator::Orchestrator;
use crate::resolver::validate_query;
use crate::video::{is_supported_url, VideoRecord};
use anyhow::{bail, Result};
use futures::future::join_all;
use indicatif::{MultiProgress, ProgressBar};

/// Run the convert command.
pub async fn run_convert(input: &str, pick: usize, all: bool, settings: Settings) -> Result<()> {
    let input = validate_query(input).map_err(|e| {
        Output::error(&e.to_string());
        e
    })?;

    if let Err(e) = preflight::check(Operation::Resolve) {
        Output::error(&e.to_string());
        Output::info("Run 'tunegrab doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings).await?;
    let tracker = orchestrator.tracker();

    let resumed = tracker.resume_pending();
    if resumed > 0 {
        Output::info(&format!("Resuming {} unfinished conversion(s)", resumed));
    }

    let videos = select_videos(&orchestrator, input, pick, all).await?;

    let multi = MultiProgress::new();
    let mut followers = Vec::with_capacity(videos.len());
    for video in videos {
        let bar = multi.add(Output::progress_bar(&video.title));
        let id = tracker.start_conversion(video).await;
        followers.push(follow(tracker.clone(), id, bar));
    }

    let outcomes = join_all(followers).await;

    let failed = outcomes
        .iter()
        .filter(|status| **status != Some(JobStatus::Completed))
        .count();
    if failed > 0 {
        bail!("{} conversion(s) did not complete", failed);
    }

    Output::success(&format!("{} conversion(s) completed", outcomes.len()));
    Ok(())
}

/// Pick the videos to convert for the given input.
async fn select_videos(
    orchestrator: &Orchestrator,
    input: &str,
    pick: usize,
    all: bool,
) -> Result<Vec<VideoRecord>> {
    let resolver = orchestrator.resolver();

    if is_supported_url(input) {
        let spinner = Output::spinner("Analyzing...");
        let video = resolver.resolve_by_url(input).await;
        spinner.finish_and_clear();

        return match video {
            Some(video) => Ok(vec![video]),
            None => {
                Output::error("Could not load the details for this video.");
                bail!("video details unavailable for {}", input)
            }
        };
    }

    let spinner = Output::spinner("Searching...");
    let mut results = resolver.resolve_by_query(input).await;
    spinner.finish_and_clear();

    if results.is_empty() {
        Output::warning("No videos found. Try a different search.");
        bail!("nothing to convert for \"{}\"", input);
    }

    if all {
        return Ok(results);
    }

    if pick == 0 || pick > results.len() {
        Output::error(&format!(
            "--pick must be between 1 and {} for this search",
            results.len()
        ));
        bail!("invalid pick {}", pick);
    }

    Ok(vec![results.swap_remove(pick - 1)])
}

/// Mirror a job's progress onto a bar until it is terminal.
async fn follow(tracker: JobTracker, id: JobId, bar: ProgressBar) -> Option<JobStatus> {
    let mut rx = tracker.subscribe();

    loop {
        let job = rx.borrow_and_update().iter().find(|j| j.id == id).cloned();
        let Some(job) = job else {
            bar.abandon_with_message("missing from history");
            return None;
        };

        bar.set_position(job.progress.floor() as u64);

        match job.status {
            JobStatus::Completed => {
                bar.finish_with_message(format!("{} done", job.record.title));
                return Some(job.status);
            }
            JobStatus::Failed => {
                let reason = job.error.as_deref().unwrap_or("conversion failed");
                bar.abandon_with_message(format!("{} failed: {}", job.record.title, reason));
                return Some(job.status);
            }
            JobStatus::Processing => {}
        }

        if rx.changed().await.is_err() {
            bar.abandon();
            return None;
        }
    }
}
