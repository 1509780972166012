//! Result resolution: turn a free-text query or a raw URL into video records.
//!
//! Both resolvers go through the [`InferenceClient`] seam and recover from every
//! collaborator or schema failure locally. Callers never see an error from
//! [`Resolver::resolve_by_query`] or [`Resolver::resolve_by_url`].

mod query;
mod url;

use crate::config::{Prompts, MAX_SEARCH_RESULTS};
use crate::error::{Result, TunegrabError};
use crate::inference::InferenceClient;
use crate::video::is_supported_url;
use std::sync::Arc;

/// Placeholder used when the collaborator omits a title.
pub const UNKNOWN_TITLE: &str = "Unknown Title";
/// Placeholder used when the collaborator omits a channel.
pub const UNKNOWN_CHANNEL: &str = "Unknown Channel";
/// Placeholder used when the collaborator omits a duration.
pub const UNKNOWN_DURATION: &str = "0:00";

/// Resolves user input into [`crate::video::VideoRecord`]s.
#[derive(Clone)]
pub struct Resolver {
    inference: Arc<dyn InferenceClient>,
    prompts: Prompts,
    max_results: usize,
    web_search: bool,
}

impl Resolver {
    /// Create a resolver with default prompts, 5 results and web search enabled.
    pub fn new(inference: Arc<dyn InferenceClient>) -> Self {
        Self {
            inference,
            prompts: Prompts::default(),
            max_results: MAX_SEARCH_RESULTS,
            web_search: true,
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Set the maximum number of search results. Values above 5 are capped.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.min(MAX_SEARCH_RESULTS);
        self
    }

    /// Enable or disable web search augmentation for queries.
    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.web_search = enabled;
        self
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }
}

/// Reject an empty or whitespace-only search query.
pub fn validate_query(query: &str) -> Result<&str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(TunegrabError::InvalidInput(
            "Please enter something to search for.".to_string(),
        ));
    }
    Ok(query)
}

/// Reject URLs that do not reference a supported video-hosting domain.
pub fn validate_url(input: &str) -> Result<&str> {
    let input = input.trim();
    if !is_supported_url(input) {
        return Err(TunegrabError::InvalidInput(
            "Please enter a valid YouTube URL.".to_string(),
        ));
    }
    Ok(input)
}
