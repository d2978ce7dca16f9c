//! Terminal reporter
//!
//! Renders a spinner status line and an `M/N` progress bar below the scrolling
//! output, and mirrors every printed line into the tracing log with ANSI
//! escapes stripped.

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;
use strip_ansi_escapes::strip;

use super::Reporter;
use crate::engine::BuildOutcome;
use crate::matrix::FirmwareSpec;

pub struct ConsoleReporter {
    verbose: bool,
    multi: MultiProgress,
    status: ProgressBar,
    progress: ProgressBar,
}

fn plain(line: &str) -> String {
    String::from_utf8_lossy(&strip(line.as_bytes())).to_string()
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        let multi = MultiProgress::new();

        let status = multi.add(ProgressBar::new_spinner());
        status.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        status.set_message("Preparing…");

        let progress = multi.add(ProgressBar::new(0));
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{pos}/{len} {bar:40.blue} {percent:>3}% {elapsed_precise}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        Self {
            verbose,
            multi,
            status,
            progress,
        }
    }

    fn print(&self, line: &str) {
        if self.multi.is_hidden() || self.multi.println(line).is_err() {
            println!("{line}");
        }
    }
}

impl Reporter for ConsoleReporter {
    fn begin(&self, total: usize) {
        self.progress.set_length(total as u64);
        self.status.enable_steady_tick(Duration::from_millis(80));
    }

    fn status(&self, message: &str) {
        self.status.set_message(message.to_string());
        tracing::info!("{}", plain(message));
    }

    fn newline(&self) {
        self.print("");
    }

    fn debug(&self, message: &str) {
        if self.verbose {
            self.print(&message.dimmed().to_string());
        }
        tracing::debug!("{}", plain(message));
    }

    fn info(&self, message: &str) {
        self.print(message);
        tracing::info!("{}", plain(message));
    }

    fn warn(&self, message: &str) {
        self.print(message);
        tracing::warn!("{}", plain(message));
    }

    fn error(&self, message: &str) {
        self.print(message);
        tracing::error!("{}", plain(message));
    }

    fn outcome(&self, firmware: &FirmwareSpec, outcome: &BuildOutcome) {
        let name = firmware.to_string();
        match outcome {
            BuildOutcome::Success(_) => {
                self.info(&format!("    {} {}", name.white(), "ok".green()));
            }
            BuildOutcome::SucceededNoArtifact => {
                self.warn(&format!("    {} {}", name.white(), "ok".yellow()));
            }
            BuildOutcome::Failed { log_file, .. } => {
                self.error(&format!("    {} {}", name.white(), "ko".red()));
                self.error(&format!("Logs: {}", log_file.display()));
            }
        }
    }

    fn advance(&self) {
        self.progress.inc(1);
    }

    fn finish(&self) {
        self.status.finish_and_clear();
        self.progress.finish_and_clear();
    }
}
