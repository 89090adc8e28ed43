//! v8cov CLI Library
//!
//! Command-line front end for the `v8cov` library: argument parsing,
//! configuration, logging setup, progress output and the convert handler.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;

pub use commands::{Cli, ColorArg, LogFormatArg, OutputTypeArg};
pub use config::{CliConfig, ColorChoice, LogFormat, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
