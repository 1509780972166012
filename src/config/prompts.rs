//! Prompt templates for Tunegrab.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("Invalid regex"));

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub search: SearchPrompts,
    pub extract: ExtractPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for free-text video search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPrompts {
    pub system: String,
    pub user: String,
}

impl Default for SearchPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a search engine for YouTube videos.

Given a search query, find real videos on YouTube that match it. Prefer popular, well-known uploads and
official channels. When you cannot confirm a video exists, return the most probable match instead of inventing
an obscure one.

For every video return:
- "id": the YouTube video ID (the value of the v= parameter)
- "title": the video title
- "channel": the channel name
- "duration": the length formatted as M:SS or H:MM:SS (e.g. "3:45")
- "url": the watch URL (https://www.youtube.com/watch?v=<id>)

Order results by relevance, best match first."#
                .to_string(),
            user: r#"Search for popular YouTube videos matching: "{{query}}".

Return a structured JSON list of at most {{max_results}} real or highly probable video matches."#
                .to_string(),
        }
    }
}

/// Prompts for metadata extraction from a single URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractPrompts {
    pub system: String,
    pub user: String,
}

impl Default for ExtractPrompts {
    fn default() -> Self {
        Self {
            system: r#"You extract metadata about YouTube videos.

Given a video URL, return a JSON object with:
- "title": the video title
- "channel": the channel name
- "duration": the length formatted as M:SS or H:MM:SS (e.g. "3:45")"#
                .to_string(),
            user: "Extract video information for the YouTube URL: {{url}}. Return title, channel, and duration in JSON format."
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let search_path = custom_path.join("search.toml");
            if search_path.exists() {
                let content = std::fs::read_to_string(&search_path)?;
                prompts.search = toml::from_str(&content)?;
            }

            let extract_path = custom_path.join("extract.toml");
            if extract_path.exists() {
                let content = std::fs::read_to_string(&extract_path)?;
                prompts.extract = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Substitution is a single pass: placeholders inside substituted values
    /// are left as they are. Unknown placeholders are kept.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
