//! History command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::conversion::{JobStatus, JobTracker, ProgressDriver, SimulatedDriver};
use crate::session_store::open_store;
use anyhow::Result;
use std::sync::Arc;

/// Run the history command.
pub async fn run_history(clear: bool, settings: Settings) -> Result<()> {
    preflight::check(Operation::History)?;

    // History never calls the inference collaborator, so no orchestrator.
    let store = open_store(&settings)?;
    let driver: Arc<dyn ProgressDriver> =
        Arc::new(SimulatedDriver::from_settings(&settings.conversion));
    let tracker = JobTracker::restore(store, driver).await;

    if clear {
        let removed = tracker.clear_history().await;
        if removed == 0 {
            Output::info("Nothing to clear.");
        } else {
            Output::success(&format!("Removed {} finished conversion(s)", removed));
        }
        return Ok(());
    }

    let jobs = tracker.list_jobs();
    if jobs.is_empty() {
        Output::info("No conversions yet.");
        Output::info("Start one with: tunegrab convert <url or search>");
        return Ok(());
    }

    Output::header(&format!("Conversion history (session '{}')", settings.session.name));
    println!();
    for job in &jobs {
        Output::job(job);
    }
    println!();

    let completed = jobs
        .iter()
        .filter(|j| j.status == JobStatus::Completed)
        .count();
    Output::kv("Total", &jobs.len().to_string());
    Output::kv("Completed", &completed.to_string());

    if let Some(active) = tracker.active_job() {
        println!();
        Output::warning(&format!(
            "Converting: {} ({:.0}%)",
            active.record.title, active.progress
        ));
    }

    Ok(())
}
