//! CLI argument definitions using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use v8cov::{ReportType, DEFAULT_EXCLUDE};

/// v8cov: convert V8 coverage output into Istanbul coverage reports
#[derive(Parser, Debug)]
#[command(name = "v8cov")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// V8 coverage file, or directory of coverage-*.json files
    #[arg(
        short = 'c',
        long,
        visible_short_alias = 'p',
        env = "V8COV_COVERAGE_PATH",
        value_name = "PATH"
    )]
    pub coverage_path: PathBuf,

    /// Write the report to this file (cannot be combined with --output-dir)
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Write the report into this directory
    #[arg(short = 'd', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Report format
    #[arg(
        short = 't',
        long,
        value_enum,
        default_value = "json",
        env = "V8COV_OUTPUT_TYPE"
    )]
    pub output_type: OutputTypeArg,

    /// Globs of script paths to skip: `-e a b` or `-e a -e b`
    #[arg(
        short = 'e',
        long,
        value_name = "GLOB",
        num_args = 1..,
        default_value = DEFAULT_EXCLUDE
    )]
    pub exclude: Vec<String>,

    /// Conversions to run at once (0 = available parallelism)
    #[arg(short = 'j', long, default_value_t = 0)]
    pub jobs: usize,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorArg,

    /// Log line format
    #[arg(long, default_value = "text", env = "V8COV_LOG_FORMAT")]
    pub log_format: LogFormatArg,
}

/// Report format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputTypeArg {
    /// Istanbul coverage map (coverage-final.json)
    #[default]
    Json,
    /// Per-file and total summaries (coverage-summary.json)
    JsonSummary,
    /// HTML report (needs --output-dir)
    Html,
    /// lcov.info plus HTML report (needs --output-dir)
    Lcov,
    /// lcov.info only
    Lcovonly,
    /// Per-file coverage table
    Text,
    /// Coverage totals
    TextSummary,
    /// Cobertura XML
    Cobertura,
}

impl From<OutputTypeArg> for ReportType {
    fn from(arg: OutputTypeArg) -> Self {
        match arg {
            OutputTypeArg::Json => Self::Json,
            OutputTypeArg::JsonSummary => Self::JsonSummary,
            OutputTypeArg::Html => Self::Html,
            OutputTypeArg::Lcov => Self::Lcov,
            OutputTypeArg::Lcovonly => Self::LcovOnly,
            OutputTypeArg::Text => Self::Text,
            OutputTypeArg::TextSummary => Self::TextSummary,
            OutputTypeArg::Cobertura => Self::Cobertura,
        }
    }
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log format argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// JSON lines
    Json,
}

impl From<LogFormatArg> for crate::config::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["v8cov", "-c", "cov"]).unwrap();
        assert_eq!(cli.coverage_path, PathBuf::from("cov"));
        assert_eq!(cli.output_type, OutputTypeArg::Json);
        assert_eq!(cli.exclude, vec!["**/node_modules/**".to_string()]);
        assert_eq!(cli.jobs, 0);
        assert!(cli.output_file.is_none());
    }

    #[test]
    fn test_p_alias() {
        let cli = Cli::try_parse_from(["v8cov", "-p", "cov"]).unwrap();
        assert_eq!(cli.coverage_path, PathBuf::from("cov"));
    }

    #[test]
    fn test_repeated_exclude_replaces_default() {
        let cli =
            Cli::try_parse_from(["v8cov", "-c", "cov", "-e", "**/test/**", "-e", "**/vendor/**"])
                .unwrap();
        assert_eq!(cli.exclude, vec!["**/test/**", "**/vendor/**"]);
    }

    #[test]
    fn test_exclude_list_after_one_flag() {
        let cli = Cli::try_parse_from(["v8cov", "-c", "cov", "-e", "**/a/**", "**/b/**"]).unwrap();
        assert_eq!(cli.exclude, vec!["**/a/**", "**/b/**"]);

        let cli = Cli::try_parse_from([
            "v8cov", "--exclude", "**/a/**", "**/b/**", "-e", "**/c/**", "-t", "text", "-c", "cov",
        ])
        .unwrap();
        assert_eq!(cli.exclude, vec!["**/a/**", "**/b/**", "**/c/**"]);
        assert_eq!(cli.output_type, OutputTypeArg::Text);
    }

    #[test]
    fn test_output_type_names() {
        for (name, expected) in [
            ("json", ReportType::Json),
            ("json-summary", ReportType::JsonSummary),
            ("html", ReportType::Html),
            ("lcov", ReportType::Lcov),
            ("lcovonly", ReportType::LcovOnly),
            ("text", ReportType::Text),
            ("text-summary", ReportType::TextSummary),
            ("cobertura", ReportType::Cobertura),
        ] {
            let cli = Cli::try_parse_from(["v8cov", "-c", "cov", "-t", name]).unwrap();
            let report: ReportType = cli.output_type.into();
            assert_eq!(report, expected);
            assert_eq!(report.name(), name);
        }
    }

    #[test]
    fn test_file_and_dir_both_parse() {
        // rejected later by the report plan, with its own message
        let cli = Cli::try_parse_from(["v8cov", "-c", "cov", "-o", "a.json", "-d", "out"]).unwrap();
        assert!(cli.output_file.is_some() && cli.output_dir.is_some());
    }

    #[test]
    fn test_coverage_path_required() {
        // Isolated from a V8COV_COVERAGE_PATH set in the environment
        if std::env::var_os("V8COV_COVERAGE_PATH").is_none() {
            assert!(Cli::try_parse_from(["v8cov"]).is_err());
        }
    }

    #[test]
    fn test_unknown_output_type_rejected() {
        assert!(Cli::try_parse_from(["v8cov", "-c", "cov", "-t", "xml"]).is_err());
    }
}
