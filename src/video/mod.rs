//! Video metadata records.
//!
//! A [`VideoRecord`] is the normalized description of one video, produced by the
//! resolvers from collaborator payloads and consumed by the conversion tracker.

pub mod schema;
mod youtube;

pub use youtube::{fallback_video_id, is_supported_url, video_id_from_url};

use serde::{Deserialize, Serialize};

/// Normalized metadata for a single video.
///
/// Every field is a non-empty string once a record leaves the resolver layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Video identifier, unique within a result set.
    pub id: String,
    /// Video title.
    pub title: String,
    /// Channel name.
    pub channel: String,
    /// Free-form duration, e.g. "3:45".
    pub duration: String,
    /// Thumbnail reference derived from `id`.
    pub thumbnail: String,
    /// Watch URL.
    pub url: String,
}

impl VideoRecord {
    /// Build a record, deriving the thumbnail from the identifier.
    pub fn new(id: String, title: String, channel: String, duration: String, url: String) -> Self {
        let thumbnail = thumbnail_for(&id);
        Self {
            id,
            title,
            channel,
            duration,
            thumbnail,
            url,
        }
    }

    /// Names of fields that are empty or whitespace-only.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("id", &self.id),
            ("title", &self.title),
            ("channel", &self.channel),
            ("duration", &self.duration),
            ("thumbnail", &self.thumbnail),
            ("url", &self.url),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Whether every field is populated.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Derive the thumbnail reference for a video identifier.
///
/// Pure: the same identifier always yields the same reference.
pub fn thumbnail_for(id: &str) -> String {
    format!("https://picsum.photos/seed/{}/320/180", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_is_deterministic() {
        assert_eq!(thumbnail_for("dQw4w9WgXcQ"), thumbnail_for("dQw4w9WgXcQ"));
        assert_eq!(
            thumbnail_for("dQw4w9WgXcQ"),
            "https://picsum.photos/seed/dQw4w9WgXcQ/320/180"
        );
        assert_ne!(thumbnail_for("a"), thumbnail_for("b"));
    }

    #[test]
    fn test_new_derives_thumbnail() {
        let record = VideoRecord::new(
            "abc".to_string(),
            "Title".to_string(),
            "Channel".to_string(),
            "1:00".to_string(),
            "https://www.youtube.com/watch?v=abc".to_string(),
        );
        assert_eq!(record.thumbnail, thumbnail_for("abc"));
        assert!(record.is_complete());
    }

    #[test]
    fn test_missing_fields() {
        let record = VideoRecord::new(
            "abc".to_string(),
            "  ".to_string(),
            "Channel".to_string(),
            String::new(),
            "https://www.youtube.com/watch?v=abc".to_string(),
        );
        assert_eq!(record.missing_fields(), vec!["title", "duration"]);
        assert!(!record.is_complete());
    }
}
