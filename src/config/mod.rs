//! Configuration module for Tunegrab.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{ExtractPrompts, Prompts, SearchPrompts};
pub use settings::{
    ConversionSettings, GeneralSettings, InferenceSettings, PromptSettings, SessionProvider,
    SessionSettings, Settings, MAX_SEARCH_RESULTS,
};
