//! Progress reporting and user-facing messages on stderr

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;
use v8cov::{CollectStats, ConversionObserver, V8CovError};

/// Progress reporter for script conversion
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: ProgressBar,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
    /// Draw a progress bar while converting
    pub show_progress: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: ProgressBar::hidden(),
            use_color,
            quiet,
            show_progress: false,
        }
    }

    /// Enable the progress bar
    #[must_use]
    pub const fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Start a progress bar over `total` scripts
    pub fn start_progress(&self, total: u64, message: &str) {
        if self.quiet || !self.show_progress {
            return;
        }

        self.progress_bar.set_length(total);
        self.progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        self.progress_bar.set_message(message.to_string());
        self.progress_bar
            .set_draw_target(ProgressDrawTarget::term(self.term.clone(), 20));
        self.progress_bar
            .enable_steady_tick(Duration::from_millis(100));
    }

    /// The bar, for writers that must not tear it
    #[must_use]
    pub const fn progress_bar(&self) -> &ProgressBar {
        &self.progress_bar
    }

    /// Increment progress
    pub fn increment(&self, delta: u64) {
        self.progress_bar.inc(delta);
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if !self.progress_bar.is_hidden() {
            self.progress_bar.finish_and_clear();
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "OK".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// One-line account of a collection run
    #[must_use]
    pub fn format_stats(&self, stats: &CollectStats, files: usize, elapsed: Duration) -> String {
        let converted = format!("{} scripts", stats.scripts_converted);
        let failed = format!("{} failed", stats.scripts_failed);
        let (converted, failed) = if self.use_color {
            let failed_style = if stats.scripts_failed > 0 {
                Style::new().red().bold()
            } else {
                Style::new().dim()
            };
            (
                Style::new().green().bold().apply_to(converted).to_string(),
                failed_style.apply_to(failed).to_string(),
            )
        } else {
            (converted, failed)
        };

        format!(
            "Converted {converted} into {files} files from {} coverage files in {:.2}s ({failed}, {} excluded, {} non-file)",
            stats.files_read,
            elapsed.as_secs_f64(),
            stats.scripts_excluded,
            stats.scripts_skipped_non_file,
        )
    }

    /// Print the collection summary
    pub fn summary(&self, stats: &CollectStats, files: usize, elapsed: Duration) {
        if self.quiet {
            return;
        }
        let _ = self.term.write_line(&self.format_stats(stats, files, elapsed));
    }
}

impl ConversionObserver for ProgressReporter {
    fn on_start(&self, total: usize) {
        self.start_progress(total as u64, "converting");
    }

    fn on_converted(&self, path: &str) {
        self.progress_bar.set_message(path.to_string());
        self.increment(1);
    }

    fn on_failed(&self, _path: &str, _error: &V8CovError) {
        self.increment(1);
    }
}
