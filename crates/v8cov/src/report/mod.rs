//! Coverage report writers
//!
//! A [`ReportPlan`] pairs a [`ReportType`] with where it goes and is
//! validated before any coverage is read. [`write_report`] then renders the
//! coverage map in the chosen format.

pub mod cobertura;
pub mod html;
pub mod json;
pub mod lcov;
pub mod text;

pub use cobertura::CoberturaFormatter;
pub use html::HtmlReport;
pub use lcov::LcovFormatter;

use crate::istanbul::CoverageMap;
use crate::result::{V8CovError, V8CovResult};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReportType {
    /// Istanbul coverage map
    #[default]
    Json,
    /// Per-file and total summaries as JSON
    JsonSummary,
    /// Browsable HTML pages
    Html,
    /// `lcov.info` plus an HTML report
    Lcov,
    /// `lcov.info` only
    LcovOnly,
    /// Per-file table
    Text,
    /// Totals only
    TextSummary,
    /// Cobertura XML
    Cobertura,
}

impl ReportType {
    /// Every report type
    pub const ALL: [Self; 8] = [
        Self::Json,
        Self::JsonSummary,
        Self::Html,
        Self::Lcov,
        Self::LcovOnly,
        Self::Text,
        Self::TextSummary,
        Self::Cobertura,
    ];

    /// Name used on the command line
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::JsonSummary => "json-summary",
            Self::Html => "html",
            Self::Lcov => "lcov",
            Self::LcovOnly => "lcovonly",
            Self::Text => "text",
            Self::TextSummary => "text-summary",
            Self::Cobertura => "cobertura",
        }
    }

    /// Produces more than one file
    #[must_use]
    pub const fn is_multi_file(self) -> bool {
        matches!(self, Self::Html | Self::Lcov)
    }

    /// Can be printed to stdout
    #[must_use]
    pub const fn supports_stdout(self) -> bool {
        matches!(
            self,
            Self::Json | Self::JsonSummary | Self::Text | Self::TextSummary
        )
    }

    /// File written inside an output directory
    #[must_use]
    pub const fn default_file_name(self) -> &'static str {
        match self {
            Self::Json => "coverage-final.json",
            Self::JsonSummary => "coverage-summary.json",
            Self::Html => "index.html",
            Self::Lcov | Self::LcovOnly => "lcov.info",
            Self::Text => "coverage.txt",
            Self::TextSummary => "coverage-summary.txt",
            Self::Cobertura => "cobertura-coverage.xml",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReportType {
    type Err = V8CovError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| V8CovError::UnknownReportType {
                name: s.to_string(),
            })
    }
}

/// Where a report is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportDestination {
    /// Standard output
    Stdout,
    /// A single file
    File(PathBuf),
    /// A directory, using the report's default file names
    Dir(PathBuf),
}

/// A validated report request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPlan {
    report_type: ReportType,
    destination: ReportDestination,
}

impl ReportPlan {
    /// Validate a report type against the requested output location
    pub fn new(
        report_type: ReportType,
        output_file: Option<PathBuf>,
        output_dir: Option<PathBuf>,
    ) -> V8CovResult<Self> {
        let destination = match (output_file, output_dir) {
            (Some(_), Some(_)) => return Err(V8CovError::ConflictingOutputs),
            (Some(_), None) if report_type.is_multi_file() => {
                return Err(V8CovError::MultiFileReport {
                    report: report_type.name().to_string(),
                })
            }
            (Some(file), None) => ReportDestination::File(file),
            (None, Some(dir)) => ReportDestination::Dir(dir),
            (None, None) if report_type.supports_stdout() => ReportDestination::Stdout,
            (None, None) => {
                return Err(V8CovError::OutputDirRequired {
                    report: report_type.name().to_string(),
                })
            }
        };
        Ok(Self {
            report_type,
            destination,
        })
    }

    /// Report type
    #[must_use]
    pub const fn report_type(&self) -> ReportType {
        self.report_type
    }

    /// Output location
    #[must_use]
    pub const fn destination(&self) -> &ReportDestination {
        &self.destination
    }
}

/// Render a single-document report
pub fn render_report(map: &CoverageMap, report_type: ReportType) -> V8CovResult<String> {
    Ok(match report_type {
        ReportType::Json => json::render_json(map)?,
        ReportType::JsonSummary => json::render_json_summary(map)?,
        ReportType::Text => text::render_text(map),
        ReportType::TextSummary => text::render_text_summary(&map.summary()),
        ReportType::Lcov | ReportType::LcovOnly => LcovFormatter::new(map).generate(),
        ReportType::Cobertura => CoberturaFormatter::new(map).generate(),
        ReportType::Html => HtmlReport::new(map).render_index(),
    })
}

/// Write a report; returns the files created
pub fn write_report(map: &CoverageMap, plan: &ReportPlan) -> V8CovResult<Vec<PathBuf>> {
    write_report_to(map, plan, &mut std::io::stdout().lock())
}

/// Write a report, sending stdout output to `out`
pub fn write_report_to<W: Write>(
    map: &CoverageMap,
    plan: &ReportPlan,
    out: &mut W,
) -> V8CovResult<Vec<PathBuf>> {
    let report_type = plan.report_type();
    match plan.destination() {
        ReportDestination::Stdout => {
            let content = render_report(map, report_type)?;
            out.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                out.write_all(b"\n")?;
            }
            out.flush()?;
            Ok(Vec::new())
        }
        ReportDestination::File(path) => {
            write_file(path, &render_report(map, report_type)?)?;
            Ok(vec![path.clone()])
        }
        ReportDestination::Dir(dir) => write_dir(map, report_type, dir),
    }
}

fn write_dir(map: &CoverageMap, report_type: ReportType, dir: &Path) -> V8CovResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| V8CovError::file_access(dir, e))?;
    match report_type {
        ReportType::Html => HtmlReport::new(map).save(dir),
        ReportType::Lcov => {
            let info = dir.join(report_type.default_file_name());
            LcovFormatter::new(map).save(&info)?;
            let mut written = vec![info];
            written.extend(HtmlReport::new(map).save(&dir.join("lcov-report"))?);
            Ok(written)
        }
        _ => {
            let path = dir.join(report_type.default_file_name());
            write_file(&path, &render_report(map, report_type)?)?;
            Ok(vec![path])
        }
    }
}

/// Write a file, creating parent directories
pub(crate) fn write_file(path: &Path, content: &str) -> V8CovResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| V8CovError::file_access(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| V8CovError::file_access(path, e))?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "wrote report file");
    Ok(())
}
