//! YouTube URL helpers.

use rand::distr::Alphanumeric;
use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

/// Length of synthesized fallback identifiers (same as a YouTube video ID).
const FALLBACK_ID_LEN: usize = 11;

static SUPPORTED_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[/.@])(?:youtube\.com|youtu\.be)(?:[/?#:]|$)").expect("Invalid regex")
});

/// Whether the input textually references a supported video-hosting domain.
pub fn is_supported_url(input: &str) -> bool {
    SUPPORTED_HOST.is_match(input.trim())
}

/// Extract the `v` query parameter from a watch URL, verbatim.
///
/// The raw text of the input is used, with no percent-encoding or decoding.
/// Empty values count as absent.
pub fn video_id_from_url(input: &str) -> Option<String> {
    let (_, query) = input.trim().split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);

    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("v="))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Synthesize a random alphanumeric identifier for URLs without a `v` parameter.
pub fn fallback_video_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(FALLBACK_ID_LEN)
        .map(char::from)
        .collect()
}
