//! Convert handler: collect V8 coverage and write the requested report

use crate::commands::Cli;
use crate::config::{CliConfig, ColorChoice, Verbosity};
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use std::sync::Arc;
use std::time::Instant;
use v8cov::{write_report, CoverageCollector, ReportType};

/// Build configuration from parsed arguments
#[must_use]
pub fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.clone().into();
    let report_type: ReportType = cli.output_type.into();

    CliConfig::new()
        .with_verbosity(verbosity)
        .with_color(color)
        .with_log_format(cli.log_format.clone().into())
        .with_parallel_jobs(cli.jobs)
        .with_coverage_path(&cli.coverage_path)
        .with_output_file(cli.output_file.clone())
        .with_output_dir(cli.output_dir.clone())
        .with_output_type(report_type.name())
        .with_exclude(cli.exclude.clone())
}

/// Progress reporter matching the configured verbosity and color
#[must_use]
pub fn progress_reporter(config: &CliConfig) -> Arc<ProgressReporter> {
    Arc::new(
        ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet())
            .with_progress(config.verbosity.is_verbose()),
    )
}

/// Run a conversion end to end
///
/// The report plan and exclude patterns are checked before any coverage
/// file is read.
pub fn execute_convert(config: &CliConfig, reporter: &Arc<ProgressReporter>) -> CliResult<()> {
    if config.coverage_path.as_os_str().is_empty() {
        return Err(CliError::invalid_argument("coverage path is empty"));
    }
    let plan = config.report_plan()?;
    let exclude = config.exclude_set()?;

    let collector = CoverageCollector::new(&config.coverage_path)
        .with_exclude(exclude)
        .with_jobs(config.effective_jobs())
        .with_observer(reporter.clone());

    tracing::info!(
        coverage_path = %config.coverage_path.display(),
        report = %plan.report_type(),
        jobs = collector.jobs(),
        "starting conversion"
    );

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(e.to_string()))?;

    let started = Instant::now();
    let (map, stats) = rt.block_on(collector.collect())?;
    reporter.finish();

    if stats.scripts_failed > 0 {
        tracing::warn!(failed = stats.scripts_failed, "some scripts could not be converted");
    }

    let written = write_report(&map, &plan)?;

    if config.verbosity.is_verbose() {
        reporter.summary(&stats, map.len(), started.elapsed());
        for path in &written {
            reporter.success(&format!("Wrote {}", path.display()));
        }
    }
    Ok(())
}
