//! Natural-language inference collaborator.
//!
//! The resolvers only talk to the collaborator through [`InferenceClient`], so
//! they can be exercised against a fake without any transport.

mod openai;
#[cfg(test)]
pub(crate) mod testing;

pub use openai::OpenAIInference;

use crate::error::Result;
use async_trait::async_trait;

/// A structured-output request for a list of video candidates.
#[derive(Debug, Clone)]
pub struct ListQuery {
    /// System instruction.
    pub system: String,
    /// User instruction.
    pub prompt: String,
    /// Enable external knowledge lookup (web search) on the collaborator.
    pub web_search: bool,
}

/// A structured-output request for a single video's descriptive fields.
#[derive(Debug, Clone)]
pub struct RecordQuery {
    /// System instruction.
    pub system: String,
    /// User instruction.
    pub prompt: String,
}

/// Trait for inference collaborators.
///
/// Both operations return the raw text payload; validation happens in
/// [`crate::video::schema`].
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Ask for an ordered list of `{id, title, channel, duration, url}` objects.
    async fn list_query(&self, query: &ListQuery) -> Result<String>;

    /// Ask for a single `{title, channel, duration}` object.
    async fn record_query(&self, query: &RecordQuery) -> Result<String>;
}
