//! Tracing subscriber setup

use crate::config::{CliConfig, LogFormat};
use indicatif::ProgressBar;
use std::io::{self, Write};
use tracing_subscriber::{fmt, fmt::MakeWriter, EnvFilter};

/// Environment variable holding an explicit log filter
pub const LOG_ENV: &str = "V8COV_LOG";

/// Filter from `V8COV_LOG` if set and valid, otherwise from verbosity
#[must_use]
pub fn env_filter(config: &CliConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.log_directive()))
}

/// Stderr writer that clears the progress bar while a log line is written
#[derive(Debug, Clone)]
pub struct ProgressWriter {
    bar: ProgressBar,
}

impl ProgressWriter {
    /// Writer sharing `bar` with the progress reporter
    #[must_use]
    pub fn new(bar: &ProgressBar) -> Self {
        Self { bar: bar.clone() }
    }
}

impl Write for ProgressWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bar.suspend(|| io::stderr().write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.bar.suspend(|| io::stderr().write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

impl<'a> MakeWriter<'a> for ProgressWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install the global subscriber, logging to stderr around `bar`
///
/// A subscriber already installed (tests, embedding) is left in place.
pub fn init_tracing(config: &CliConfig, bar: &ProgressBar) {
    let builder = fmt()
        .with_env_filter(env_filter(config))
        .with_writer(ProgressWriter::new(bar))
        .with_target(false)
        .with_ansi(config.color.should_color());

    let _ = match config.log_format {
        LogFormat::Text => builder.without_time().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Verbosity;
    use indicatif::ProgressDrawTarget;

    #[test]
    fn test_filter_follows_verbosity() {
        if std::env::var_os(LOG_ENV).is_some() {
            return;
        }
        let config = CliConfig::new().with_verbosity(Verbosity::Debug);
        assert_eq!(env_filter(&config).to_string(), "debug");
        let config = CliConfig::new().with_verbosity(Verbosity::Quiet);
        assert_eq!(env_filter(&config).to_string(), "error");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let config = CliConfig::new();
        let bar = ProgressBar::hidden();
        init_tracing(&config, &bar);
        init_tracing(&config.with_log_format(LogFormat::Json), &bar);
    }

    #[test]
    fn test_writer_keeps_bar_state() {
        let bar = ProgressBar::with_draw_target(Some(10), ProgressDrawTarget::hidden());
        bar.inc(4);
        let mut writer = ProgressWriter::new(&bar).make_writer();
        writer.write_all(b"").unwrap();
        writer.flush().unwrap();
        assert_eq!(bar.position(), 4);
        assert!(!bar.is_finished());
    }
}
