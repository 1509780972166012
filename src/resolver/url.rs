//! Direct URL resolution.

use super::{Resolver, UNKNOWN_CHANNEL, UNKNOWN_DURATION, UNKNOWN_TITLE};
use crate::error::Result;
use crate::inference::RecordQuery;
use crate::video::schema::parse_info_payload;
use crate::video::{fallback_video_id, video_id_from_url, VideoRecord};
use std::collections::HashMap;
use tracing::{info, instrument, warn};

impl Resolver {
    /// Resolve a single video from its URL.
    ///
    /// The caller is expected to have checked the domain with
    /// [`super::validate_url`]. Missing descriptive fields fall back to
    /// placeholders; only a failed call or a non-object payload yields `None`.
    pub async fn resolve_by_url(&self, url: &str) -> Option<VideoRecord> {
        match self.try_resolve_by_url(url).await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Info fetch failed: {}", e);
                None
            }
        }
    }

    /// Fallible variant of [`Resolver::resolve_by_url`].
    #[instrument(skip(self))]
    pub async fn try_resolve_by_url(&self, url: &str) -> Result<VideoRecord> {
        let url = url.trim();

        let mut vars = HashMap::new();
        vars.insert("url".to_string(), url.to_string());

        let request = RecordQuery {
            system: self.prompts.render_with_custom(&self.prompts.extract.system, &vars),
            prompt: self.prompts.render_with_custom(&self.prompts.extract.user, &vars),
        };

        let payload = self.inference.record_query(&request).await?;
        let info = parse_info_payload(&payload)?;

        let id = video_id_from_url(url).unwrap_or_else(fallback_video_id);

        let record = VideoRecord::new(
            id,
            info.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            info.channel.unwrap_or_else(|| UNKNOWN_CHANNEL.to_string()),
            info.duration.unwrap_or_else(|| UNKNOWN_DURATION.to_string()),
            url.to_string(),
        );

        info!("Resolved video {} ({})", record.id, record.title);
        Ok(record)
    }
}
