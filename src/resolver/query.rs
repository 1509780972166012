//! Free-text query resolution.

use super::Resolver;
use crate::error::Result;
use crate::inference::ListQuery;
use crate::video::schema::parse_search_payload;
use crate::video::VideoRecord;
use std::collections::HashMap;
use tracing::{info, instrument, warn};

impl Resolver {
    /// Search for videos matching a free-text query.
    ///
    /// Returns at most 5 complete records in collaborator order. Any failure
    /// yields an empty list, so "no results" and "error" look the same here;
    /// use [`Resolver::try_resolve_by_query`] when the difference matters.
    pub async fn resolve_by_query(&self, query: &str) -> Vec<VideoRecord> {
        match self.try_resolve_by_query(query).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Search failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Fallible variant of [`Resolver::resolve_by_query`].
    #[instrument(skip(self))]
    pub async fn try_resolve_by_query(&self, query: &str) -> Result<Vec<VideoRecord>> {
        let query = query.trim();
        if query.is_empty() || self.max_results == 0 {
            return Ok(Vec::new());
        }

        let mut vars = HashMap::new();
        vars.insert("query".to_string(), query.to_string());
        vars.insert("max_results".to_string(), self.max_results.to_string());

        let request = ListQuery {
            system: self.prompts.render_with_custom(&self.prompts.search.system, &vars),
            prompt: self.prompts.render_with_custom(&self.prompts.search.user, &vars),
            web_search: self.web_search,
        };

        let payload = self.inference.list_query(&request).await?;
        let mut records = parse_search_payload(&payload)?;
        records.truncate(self.max_results);

        info!("Resolved {} videos", records.len());
        Ok(records)
    }
}
