//! v8cov CLI: convert V8 coverage into Istanbul reports
//!
//! ## Usage
//!
//! ```bash
//! v8cov -c ./coverage-tmp                          # coverage map as JSON on stdout
//! v8cov -c ./coverage-tmp -t lcov -d coverage      # lcov.info + HTML report
//! v8cov -c ./coverage-tmp -t text-summary          # totals on stdout
//! v8cov -c ./coverage-tmp -e '**/test/**' -o cov.json
//! ```

use clap::Parser;
use std::process::ExitCode;
use v8cov_cli::{
    handlers::{build_config, execute_convert, progress_reporter},
    logging::init_tracing,
    Cli, CliResult,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    // Build configuration from CLI args
    let config = build_config(&cli);
    let reporter = progress_reporter(&config);
    init_tracing(&config, reporter.progress_bar());

    execute_convert(&config, &reporter)
}
