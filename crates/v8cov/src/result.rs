//! Result and error types for v8cov.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for v8cov operations
pub type V8CovResult<T> = Result<T, V8CovError>;

/// Errors that can occur while converting or reporting coverage
#[derive(Debug, Error)]
pub enum V8CovError {
    /// Coverage path does not exist
    #[error("Coverage path not found: {}", path.display())]
    CoveragePathNotFound {
        /// Path given on the command line
        path: PathBuf,
    },

    /// A file could not be read or written
    #[error("Failed to access {}: {source}", path.display())]
    FileAccess {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Coverage JSON did not match the V8 schema
    #[error("Invalid V8 coverage in {}: {message}", path.display())]
    InvalidCoverage {
        /// File that failed validation
        path: PathBuf,
        /// Validation message
        message: String,
    },

    /// Exclude pattern is not a valid glob
    #[error("Invalid exclude pattern '{pattern}': {message}")]
    InvalidPattern {
        /// Offending pattern
        pattern: String,
        /// Parser message
        message: String,
    },

    /// A coverage range lies outside the script source
    #[error("Coverage range {start}..{end} is outside of the source ({eof} characters)")]
    RangeOutOfBounds {
        /// Range start offset
        start: u32,
        /// Range end offset
        end: u32,
        /// Source length in UTF-16 units
        eof: u32,
    },

    /// Both an output file and an output directory were requested
    #[error("Cannot specify both outputDir and outputFile")]
    ConflictingOutputs,

    /// Report type needs a directory
    #[error("Output directory is required for {report} output")]
    OutputDirRequired {
        /// Report type name
        report: String,
    },

    /// Report type writes several files
    #[error(
        "Output type {report} cannot be used with 'outputFile' as it produces multiple files. Use 'outputDir' instead."
    )]
    MultiFileReport {
        /// Report type name
        report: String,
    },

    /// Unknown report type name
    #[error("Unknown output type: {name}")]
    UnknownReportType {
        /// Name that failed to parse
        name: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl V8CovError {
    /// Attach a path to an I/O error
    #[must_use]
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicting_outputs_message() {
        assert_eq!(
            V8CovError::ConflictingOutputs.to_string(),
            "Cannot specify both outputDir and outputFile"
        );
    }

    #[test]
    fn test_multi_file_message_names_report() {
        let err = V8CovError::MultiFileReport {
            report: "html".to_string(),
        };
        assert!(err.to_string().starts_with("Output type html cannot be used"));
        assert!(err.to_string().contains("Use 'outputDir' instead."));
    }

    #[test]
    fn test_file_access_includes_path() {
        let err = V8CovError::file_access(
            "/tmp/missing.js",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing.js"));
        assert!(msg.contains("gone"));
    }
}
