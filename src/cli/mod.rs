//! CLI module for Tunegrab.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Tunegrab - search videos and convert them to audio
///
/// Finds videos with an AI-powered search, resolves YouTube links and tracks
/// audio conversion jobs across a session.
#[derive(Parser, Debug)]
#[command(name = "tunegrab")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search for videos by free text
    Search {
        /// Music, artist or playlist to look for
        query: String,
    },

    /// Show the details of a YouTube video by URL
    Url {
        /// Full YouTube URL (https://www.youtube.com/watch?v=...)
        url: String,
    },

    /// Convert a video to audio and follow the progress
    Convert {
        /// YouTube URL, or a search query
        input: String,

        /// Which search result to convert (1-based)
        #[arg(short, long, default_value = "1", conflicts_with = "all")]
        pick: usize,

        /// Convert every search result concurrently
        #[arg(long)]
        all: bool,
    },

    /// Show conversion history
    History {
        /// Remove finished conversions from the history
        #[arg(long)]
        clear: bool,
    },

    /// Start HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_convert() {
        let cli = Cli::parse_from(["tunegrab", "convert", "lofi beats", "--pick", "3"]);
        match cli.command {
            Commands::Convert { input, pick, all } => {
                assert_eq!(input, "lofi beats");
                assert_eq!(pick, 3);
                assert!(!all);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_pick_conflicts_with_all() {
        let result = Cli::try_parse_from(["tunegrab", "convert", "x", "--pick", "2", "--all"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["tunegrab", "-vv", "history", "--clear", "-c", "/tmp/t.toml"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config.as_deref(), Some("/tmp/t.toml"));
        assert!(matches!(cli.command, Commands::History { clear: true }));
    }
}
