//! Tunegrab - video search and audio conversion tracking
//!
//! Finds videos with an LLM-backed search, resolves YouTube links into
//! metadata records and tracks simulated video-to-audio conversion jobs.
//!
//! # Overview
//!
//! Tunegrab allows you to:
//! - Search for music videos by free text (at most 5 results)
//! - Resolve a YouTube URL into title, channel and duration
//! - Start conversions and follow their progress to completion
//! - Keep a conversion history per session, in memory or in SQLite
//!
//! # Architecture
//!
//! - `video` - Video records and payload validation
//! - `inference` - Inference collaborator abstraction (OpenAI)
//! - `resolver` - Query and URL resolution
//! - `conversion` - Conversion jobs, progress drivers and the job tracker
//! - `session_store` - Session-scoped persistence
//! - `config` - Configuration and prompt templates
//! - `orchestrator` - Wires everything together
//!
//! # Example
//!
//! ```rust,no_run
//! use tunegrab::config::Settings;
//! use tunegrab::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings).await?;
//!
//!     let videos = orchestrator.resolver().resolve_by_query("lofi hip hop").await;
//!     if let Some(video) = videos.into_iter().next() {
//!         let tracker = orchestrator.tracker();
//!         let id = tracker.start_conversion(video).await;
//!         let job = tracker.wait_for_terminal(&id).await;
//!         println!("{:?}", job.map(|j| j.status));
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod conversion;
pub mod error;
pub mod inference;
pub mod openai;
pub mod orchestrator;
pub mod resolver;
pub mod session_store;
pub mod video;

pub use error::{Result, TunegrabError};
