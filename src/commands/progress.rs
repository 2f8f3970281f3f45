// src/commands/progress.rs
//! Progress display for batch operations
//!
//! An overall bar counts processed packages; the message shows the package
//! that finished last. Hidden when stderr is not a terminal.

use bioarch_sync::batch::{PackageOutcome, PackageStatus};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::IsTerminal;

/// Progress tracker for a list of packages
pub struct BatchProgress {
    bar: ProgressBar,
}

impl BatchProgress {
    /// Create a tracker for `total` packages
    ///
    /// # Arguments
    /// * `total` - Number of packages in the batch
    /// * `operation` - Description of the operation (e.g., "Updating")
    pub fn new(total: u64, operation: &str) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix} ({pos}/{len}) [{bar:40.green/dim}] {percent}% {wide_msg}")
                .expect("Invalid progress bar template")
                .progress_chars("##-"),
        );
        bar.set_prefix(operation.to_string());
        if !std::io::stderr().is_terminal() {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        Self { bar }
    }

    /// Record a finished package
    pub fn package_done(&self, outcome: &PackageOutcome) {
        let mark = match &outcome.status {
            PackageStatus::Updated { .. } => "updated",
            PackageStatus::Unchanged => "unchanged",
            PackageStatus::Failed(_) => "FAILED",
        };
        self.bar.set_message(format!("{} [{}]", outcome.name, mark));
        self.bar.inc(1);
    }

    /// Advance by one with a plain message
    pub fn step(&self, message: &str) {
        self.bar.set_message(message.to_string());
        self.bar.inc(1);
    }

    /// Clear the bar once the batch is over
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
