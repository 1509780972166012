//! CLI output formatting utilities.

use crate::conversion::{ConversionJob, JobStatus};
use crate::video::VideoRecord;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a video card, optionally numbered.
    pub fn video(index: Option<usize>, video: &VideoRecord, processing: bool) {
        let marker = match index {
            Some(i) => style(format!("{:>2}.", i)).cyan(),
            None => style(" *".to_string()).cyan(),
        };
        let badge = if processing {
            format!(" {}", style("[converting]").yellow())
        } else {
            String::new()
        };

        println!(
            "{} {} ({}){}",
            marker,
            style(&video.title).bold(),
            video.duration,
            badge
        );
        println!("    {} · {}", video.channel, style(&video.url).dim());
    }

    /// Print one history entry.
    pub fn job(job: &ConversionJob) {
        let status = match job.status {
            JobStatus::Processing => style(format!("{:>5.1}%", job.progress)).yellow(),
            JobStatus::Completed => style("  done".to_string()).green(),
            JobStatus::Failed => style("failed".to_string()).red(),
        };

        println!(
            "  {} {} {}",
            status,
            style(&job.record.title).bold(),
            style(job.created_at.format("%Y-%m-%d %H:%M:%S")).dim()
        );
        if let Some(error) = &job.error {
            println!("         {}", style(error).red());
        }
    }

    /// Create a percentage progress bar for a conversion.
    pub fn progress_bar(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new(100);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.red/blue}] {pos:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message(truncate(msg, 48));
        pb
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Truncate text to `max_chars` characters with an ellipsis.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
