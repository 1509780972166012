//! Tunegrab CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tunegrab::cli::{commands, Cli, Commands, Output};
use tunegrab::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("tunegrab={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config_path = cli.config.as_ref().map(PathBuf::from);

    // Config and doctor must still work when the file is broken.
    let settings = match Settings::load_from(config_path.as_ref()) {
        Ok(settings) => settings,
        Err(e) if matches!(cli.command, Commands::Config { .. } | Commands::Doctor) => {
            Output::warning(&format!("Could not load config, using defaults: {}", e));
            Settings::default()
        }
        Err(e) => return Err(e.into()),
    };

    std::fs::create_dir_all(settings.data_dir())?;

    match &cli.command {
        Commands::Search { query } => {
            commands::run_search(query, settings).await?;
        }

        Commands::Url { url } => {
            commands::run_url(url, settings).await?;
        }

        Commands::Convert { input, pick, all } => {
            commands::run_convert(input, *pick, *all, settings).await?;
        }

        Commands::History { clear } => {
            commands::run_history(*clear, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(config_path.as_deref(), &settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
