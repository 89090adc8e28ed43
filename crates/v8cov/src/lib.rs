//! v8cov: V8 coverage to Istanbul
//!
//! Converts the raw per-function coverage V8 writes to `NODE_V8_COVERAGE`
//! into an Istanbul coverage map and renders the usual coverage reports.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ coverage-*.  │   │ v8 schema    │   │ V8ToIstanbul │   │ CoverageMap  │
//! │ json files   │──►│ + exclude    │──►│ (per script, │──►│ merge        │──► report
//! │ (discover)   │   │ + file://    │   │  tokio task) │   │              │
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use v8cov::{CoverageCollector, ReportPlan, ReportType, write_report};
//!
//! # async fn run() -> v8cov::V8CovResult<()> {
//! let plan = ReportPlan::new(ReportType::Lcov, None, Some("coverage".into()))?;
//! let (map, stats) = CoverageCollector::new("./coverage-tmp").collect().await?;
//! println!("converted {} scripts", stats.scripts_converted);
//! write_report(&map, &plan)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Building a coverage map from a coverage directory
pub mod collect;

/// V8 → Istanbul conversion of a single script
pub mod convert;

/// Coverage file discovery
pub mod discover;

/// Glob-based exclusion of script paths
pub mod exclude;

/// Istanbul coverage map, merge and summaries
pub mod istanbul;

/// Report formats and dispatch
pub mod report;

/// Script source line table
pub mod source;

/// V8 coverage JSON schema
pub mod v8;

mod result;

pub use collect::{CollectStats, ConversionObserver, CoverageCollector, NoopObserver};
pub use convert::{convert_script, convert_source, V8ToIstanbul};
pub use discover::find_coverage_files;
pub use exclude::{ExcludeSet, DEFAULT_EXCLUDE};
pub use istanbul::{
    BranchMapping, CoverageMap, CoverageSummary, FileCoverage, FunctionMapping, Pct, Position,
    Range, Totals, WatermarkLevel, Watermarks,
};
pub use report::{
    render_report, write_report, write_report_to, ReportDestination, ReportPlan, ReportType,
};
pub use result::{V8CovError, V8CovResult};
pub use source::{CovLine, SourceLines};
pub use v8::{
    load_process_coverage, parse_process_coverage, CoverageRange, FunctionCoverage,
    ProcessCoverage, ScriptCoverage,
};
