//! Doctor command - verify configuration and the session store.

use crate::cli::Output;
use crate::config::{SessionProvider, Settings};
use crate::conversion::HISTORY_KEY;
use crate::session_store::open_store;
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(config_path: Option<&Path>, settings: &Settings) -> anyhow::Result<()> {
    Output::header("Tunegrab Doctor");
    println!();
    println!("Checking configuration and session storage...\n");

    let mut checks = Vec::new();

    println!("{}", style("Inference").bold());
    let section = vec![
        check_openai_api_key(std::env::var("OPENAI_API_KEY").ok().as_deref()),
        check_models(settings),
    ];
    print_section(&section);
    checks.extend(section);

    println!();

    println!("{}", style("Configuration").bold());
    let default_path = Settings::default_config_path();
    let section = vec![
        check_config_file(config_path.unwrap_or(&default_path)),
        check_limits(settings),
    ];
    print_section(&section);
    checks.extend(section);

    println!();

    println!("{}", style("Session").bold());
    let section = vec![check_data_dir(settings), check_session_store(settings).await];
    print_section(&section);
    checks.extend(section);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Tunegrab.",
            errors
        ));
        anyhow::bail!("doctor found {} error(s)", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Tunegrab is ready to use.");
    }

    Ok(())
}

fn print_section(checks: &[CheckResult]) {
    for check in checks {
        check.print();
    }
}

/// Check the OpenAI API key value.
fn check_openai_api_key(key: Option<&str>) -> CheckResult {
    const HINT: &str = "Set with: export OPENAI_API_KEY='sk-...'";

    match key {
        Some(key) if key.starts_with("sk-") && key.len() > 20 => {
            let head: String = key.chars().take(7).collect();
            let tail: String = key.chars().skip(key.chars().count() - 4).collect();
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({}...{})", head, tail))
        }
        Some("") => CheckResult::error("OPENAI_API_KEY", "empty", HINT),
        Some(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        None => CheckResult::error("OPENAI_API_KEY", "not set", HINT),
    }
}

fn check_models(settings: &Settings) -> CheckResult {
    let inference = &settings.inference;
    let search_model = if inference.web_search {
        format!("{} (web search)", inference.search_model)
    } else {
        inference.model.clone()
    };

    CheckResult::ok(
        "Models",
        &format!("search: {}, extract: {}", search_model, inference.model),
    )
}

/// Check if the config file exists.
fn check_config_file(path: &Path) -> CheckResult {
    if path.exists() {
        CheckResult::ok("Config file", &format!("{}", path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: tunegrab config edit",
        )
    }
}

fn check_limits(settings: &Settings) -> CheckResult {
    if let Err(e) = settings.validate() {
        return CheckResult::error("Settings", &e.to_string(), "Edit with: tunegrab config edit");
    }

    let limit = settings.inference.result_limit();
    if limit < settings.inference.max_results {
        CheckResult::warning(
            "Settings",
            &format!(
                "max_results = {} is capped at {}",
                settings.inference.max_results, limit
            ),
            "Search never returns more than 5 videos",
        )
    } else {
        CheckResult::ok(
            "Settings",
            &format!(
                "up to {} results, tick every {} ms",
                limit, settings.conversion.tick_interval_ms
            ),
        )
    }
}

fn check_data_dir(settings: &Settings) -> CheckResult {
    let data_dir = settings.data_dir();
    if data_dir.exists() {
        CheckResult::ok("Data directory", &format!("{}", data_dir.display()))
    } else {
        CheckResult::warning(
            "Data directory",
            &format!("{} (will be created)", data_dir.display()),
            "Directory will be created on first use",
        )
    }
}

/// Open the configured session store and read the history document.
async fn check_session_store(settings: &Settings) -> CheckResult {
    let name = format!("Session store ({})", settings.session.provider);
    let hint = match settings.session.provider {
        SessionProvider::Sqlite => "Check that the sqlite_path directory is writable",
        SessionProvider::Memory => "The memory store keeps no history between runs",
    };

    let store = match open_store(settings) {
        Ok(store) => store,
        Err(e) => return CheckResult::error(&name, &e.to_string(), hint),
    };

    match store.load(HISTORY_KEY).await {
        Ok(Some(document)) => {
            match serde_json::from_str::<Vec<serde_json::Value>>(&document) {
                Ok(jobs) => CheckResult::ok(
                    &name,
                    &format!("session '{}', {} job(s)", settings.session.name, jobs.len()),
                ),
                Err(_) => CheckResult::warning(
                    &name,
                    "history is unreadable and will be ignored",
                    "Run: tunegrab history --clear",
                ),
            }
        }
        Ok(None) if settings.session.provider == SessionProvider::Memory => {
            CheckResult::warning(&name, "history is not kept between runs", hint)
        }
        Ok(None) => CheckResult::ok(
            &name,
            &format!("session '{}', no history yet", settings.session.name),
        ),
        Err(e) => CheckResult::error(&name, &e.to_string(), hint),
    }
}
