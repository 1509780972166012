//! Configuration settings for Tunegrab.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Hard upper bound on the number of search results returned to a caller.
pub const MAX_SEARCH_RESULTS: usize = 5;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub inference: InferenceSettings,
    pub conversion: ConversionSettings,
    pub session: SessionSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.tunegrab".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Settings for the natural-language inference collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceSettings {
    /// Model used for metadata extraction.
    pub model: String,
    /// Search-capable model used when web search augmentation is enabled.
    pub search_model: String,
    /// Enable web search augmentation for free-text queries.
    pub web_search: bool,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Maximum number of search results (capped at 5).
    pub max_results: usize,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            search_model: "gpt-4o-mini-search-preview".to_string(),
            web_search: true,
            timeout_seconds: crate::openai::DEFAULT_TIMEOUT_SECS,
            max_results: MAX_SEARCH_RESULTS,
        }
    }
}

impl InferenceSettings {
    /// Effective result limit, never above [`MAX_SEARCH_RESULTS`].
    pub fn result_limit(&self) -> usize {
        self.max_results.min(MAX_SEARCH_RESULTS)
    }
}

/// Settings for the simulated conversion driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionSettings {
    /// Interval between progress ticks in milliseconds.
    pub tick_interval_ms: u64,
    /// Upper (exclusive) bound of the random per-tick progress increment.
    pub max_increment: f64,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 400,
            max_increment: 15.0,
        }
    }
}

/// Session store provider type.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SessionProvider {
    /// Keep the job history for the lifetime of the process only.
    Memory,
    /// Persist the job history in a SQLite database.
    #[default]
    Sqlite,
}

impl std::str::FromStr for SessionProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(SessionProvider::Memory),
            "sqlite" => Ok(SessionProvider::Sqlite),
            _ => Err(format!("Unknown session provider: {}", s)),
        }
    }
}

impl std::fmt::Display for SessionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionProvider::Memory => write!(f, "memory"),
            SessionProvider::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Session persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Session store provider (memory, sqlite).
    pub provider: SessionProvider,
    /// Name of the session whose history is loaded and saved.
    pub name: String,
    /// Path to the SQLite database (for sqlite provider).
    pub sqlite_path: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            provider: SessionProvider::Sqlite,
            name: "default".to_string(),
            sqlite_path: "~/.tunegrab/session.db".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the conversion driver or resolver cannot work with.
    pub fn validate(&self) -> crate::error::Result<()> {
        let increment = self.conversion.max_increment;
        if !increment.is_finite() || increment <= 0.0 {
            return Err(crate::error::TunegrabError::Config(format!(
                "conversion.max_increment must be a positive number, got {}",
                increment
            )));
        }
        if self.conversion.tick_interval_ms == 0 {
            return Err(crate::error::TunegrabError::Config(
                "conversion.tick_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.session.name.trim().is_empty() {
            return Err(crate::error::TunegrabError::Config(
                "session.name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::TunegrabError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tunegrab")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite session database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.session.sqlite_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.inference.result_limit(), 5);
        assert_eq!(settings.conversion.tick_interval_ms, 400);
        assert_eq!(settings.session.provider, SessionProvider::Sqlite);
    }

    #[test]
    fn test_result_limit_is_capped() {
        let mut settings = Settings::default();
        settings.inference.max_results = 50;
        assert_eq!(settings.inference.result_limit(), MAX_SEARCH_RESULTS);

        settings.inference.max_results = 3;
        assert_eq!(settings.inference.result_limit(), 3);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [conversion]
            tick_interval_ms = 50

            [session]
            provider = "memory"
            "#,
        )
        .unwrap();

        assert_eq!(settings.conversion.tick_interval_ms, 50);
        assert_eq!(settings.conversion.max_increment, 15.0);
        assert_eq!(settings.session.provider, SessionProvider::Memory);
        assert_eq!(settings.session.name, "default");
        assert_eq!(settings.inference.model, "gpt-4o-mini");
    }

    #[test]
    fn test_validate_rejects_bad_increment() {
        let mut settings = Settings::default();
        settings.conversion.max_increment = 0.0;
        assert!(settings.validate().is_err());

        settings.conversion.max_increment = f64::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.session.name = "evening".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.session.name, "evening");
    }

    #[test]
    fn test_session_provider_parse() {
        assert_eq!("SQLite".parse::<SessionProvider>().unwrap(), SessionProvider::Sqlite);
        assert_eq!("memory".parse::<SessionProvider>().unwrap(), SessionProvider::Memory);
        assert!("redis".parse::<SessionProvider>().is_err());
    }
}
