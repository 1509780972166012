//! Application orchestrator for Tunegrab.
//!
//! Builds the resolver and the job tracker from settings and exposes the
//! search, resolve and convert flow to the CLI and the HTTP server.

use crate::config::{Prompts, Settings};
use crate::conversion::{JobTracker, ProgressDriver, SimulatedDriver};
use crate::error::Result;
use crate::inference::{InferenceClient, OpenAIInference};
use crate::resolver::Resolver;
use crate::session_store::{open_store, SessionStore};
use std::sync::Arc;
use tracing::info;

/// The main orchestrator for the Tunegrab flow.
pub struct Orchestrator {
    settings: Settings,
    resolver: Resolver,
    tracker: JobTracker,
}

impl Orchestrator {
    /// Create an orchestrator from settings, restoring the session history.
    pub async fn new(settings: Settings) -> Result<Self> {
        let inference: Arc<dyn InferenceClient> = Arc::new(OpenAIInference::new(&settings.inference)?);
        let store = open_store(&settings)?;
        let driver: Arc<dyn ProgressDriver> = Arc::new(SimulatedDriver::from_settings(&settings.conversion));

        Self::with_components(settings, inference, store, driver).await
    }

    /// Create an orchestrator with custom components.
    pub async fn with_components(
        settings: Settings,
        inference: Arc<dyn InferenceClient>,
        store: Arc<dyn SessionStore>,
        driver: Arc<dyn ProgressDriver>,
    ) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let resolver = Resolver::new(inference)
            .with_prompts(prompts)
            .with_max_results(settings.inference.result_limit())
            .with_web_search(settings.inference.web_search);

        info!(
            "Using {} session store (session '{}')",
            settings.session.provider, settings.session.name
        );
        let tracker = JobTracker::restore(store, driver).await;

        Ok(Self {
            settings,
            resolver,
            tracker,
        })
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn tracker(&self) -> &JobTracker {
        &self.tracker
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
