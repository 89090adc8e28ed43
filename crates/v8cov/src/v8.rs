//! V8 Profiler Coverage Schema
//!
//! Deserializes the JSON written by `NODE_V8_COVERAGE`, `deno coverage`
//! and the Chrome DevTools Protocol `Profiler.takePreciseCoverage` call.
//!
//! ## Format
//!
//! ```text
//! { "result": [ { "url": "file:///app/main.js",
//!                 "functions": [ { "functionName": "main",
//!                                  "isBlockCoverage": false,
//!                                  "ranges": [ { "startOffset": 0,
//!                                                "endOffset": 120,
//!                                                "count": 1 } ] } ] } ] }
//! ```
//!
//! Offsets are UTF-16 code-unit positions in the script source. Fields the
//! converter does not need (`scriptId`, `timestamp`, ...) are ignored.

use crate::result::{V8CovError, V8CovResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// URL scheme of scripts loaded from the local filesystem
pub const FILE_URL_PREFIX: &str = "file://";

/// A range of characters in a script that was covered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageRange {
    /// Start offset (UTF-16 units)
    pub start_offset: u32,
    /// End offset (UTF-16 units, exclusive)
    pub end_offset: u32,
    /// Number of times this range was executed
    pub count: u64,
}

/// Coverage data for a single function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCoverage {
    /// Function name (absent or empty for anonymous functions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    /// Whether the ranges are block-granular
    pub is_block_coverage: bool,
    /// Ranges within this function; the first spans the whole function
    pub ranges: Vec<CoverageRange>,
}

impl FunctionCoverage {
    /// Function name, `None` for anonymous functions
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.function_name.as_deref().filter(|n| !n.is_empty())
    }
}

/// Coverage data for a single script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptCoverage {
    /// Script URL
    pub url: String,
    /// Functions in this script
    pub functions: Vec<FunctionCoverage>,
}

impl ScriptCoverage {
    /// Whether the script was loaded from a `file://` URL
    #[must_use]
    pub fn is_file_url(&self) -> bool {
        self.url.starts_with(FILE_URL_PREFIX)
    }

    /// Filesystem path of the script, for `file://` URLs only
    #[must_use]
    pub fn file_path(&self) -> Option<&str> {
        self.url.strip_prefix(FILE_URL_PREFIX)
    }
}

/// One coverage file: every script seen by a single V8 isolate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessCoverage {
    /// Coverage per script
    pub result: Vec<ScriptCoverage>,
}

impl ProcessCoverage {
    /// All scripts in the file
    #[must_use]
    pub fn scripts(&self) -> &[ScriptCoverage] {
        &self.result
    }

    /// Scripts loaded from the local filesystem
    pub fn file_scripts(&self) -> impl Iterator<Item = &ScriptCoverage> {
        self.result.iter().filter(|s| s.is_file_url())
    }
}

/// Parse and validate coverage JSON
pub fn parse_process_coverage(json: &str) -> Result<ProcessCoverage, serde_json::Error> {
    serde_json::from_str(json)
}

/// Read and validate a coverage JSON file
pub fn load_process_coverage(path: &Path) -> V8CovResult<ProcessCoverage> {
    let content =
        std::fs::read_to_string(path).map_err(|e| V8CovError::file_access(path, e))?;
    parse_process_coverage(&content).map_err(|e| V8CovError::InvalidCoverage {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "result": [
            {
                "scriptId": "42",
                "url": "file:///app/src/main.js",
                "functions": [
                    {
                        "functionName": "",
                        "isBlockCoverage": true,
                        "ranges": [{ "startOffset": 0, "endOffset": 120, "count": 1 }]
                    },
                    {
                        "functionName": "unused",
                        "isBlockCoverage": false,
                        "ranges": [{ "startOffset": 30, "endOffset": 60, "count": 0 }]
                    }
                ]
            },
            {
                "scriptId": "7",
                "url": "node:internal/bootstrap",
                "functions": []
            }
        ],
        "timestamp": 1234.5
    }"#;

    fn range(start: u32, end: u32, count: u64) -> CoverageRange {
        CoverageRange {
            start_offset: start,
            end_offset: end,
            count,
        }
    }

    #[test]
    fn test_parse_sample() {
        let coverage = parse_process_coverage(SAMPLE).unwrap();
        assert_eq!(coverage.scripts().len(), 2);
        let main = &coverage.scripts()[0];
        assert_eq!(main.url, "file:///app/src/main.js");
        assert_eq!(main.functions.len(), 2);
        assert!(main.functions[0].is_block_coverage);
        assert_eq!(main.functions[1].ranges[0], range(30, 60, 0));
    }

    #[test]
    fn test_missing_function_name_is_anonymous() {
        let json = r#"{"result":[{"url":"file:///a.js","functions":[
            {"isBlockCoverage":false,"ranges":[]}]}]}"#;
        let coverage = parse_process_coverage(json).unwrap();
        let func = &coverage.result[0].functions[0];
        assert!(func.function_name.is_none());
        assert!(func.name().is_none());
    }

    #[test]
    fn test_empty_function_name_is_anonymous() {
        let coverage = parse_process_coverage(SAMPLE).unwrap();
        assert!(coverage.result[0].functions[0].name().is_none());
        assert_eq!(coverage.result[0].functions[1].name(), Some("unused"));
    }

    #[test]
    fn test_missing_result_rejected() {
        assert!(parse_process_coverage(r#"{"scripts": []}"#).is_err());
    }

    #[test]
    fn test_missing_block_flag_rejected() {
        let json = r#"{"result":[{"url":"file:///a.js","functions":[{"ranges":[]}]}]}"#;
        let err = parse_process_coverage(json).unwrap_err();
        assert!(err.to_string().contains("isBlockCoverage"));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let json = r#"{"result":[{"url":5,"functions":[]}]}"#;
        assert!(parse_process_coverage(json).is_err());
    }

    #[test]
    fn test_file_scripts_filter() {
        let coverage = parse_process_coverage(SAMPLE).unwrap();
        let files: Vec<_> = coverage.file_scripts().collect();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_path(), Some("/app/src/main.js"));
    }

    #[test]
    fn test_non_file_url_has_no_path() {
        let script = ScriptCoverage {
            url: "https://cdn.example.com/app.js".to_string(),
            functions: vec![],
        };
        assert!(!script.is_file_url());
        assert!(script.file_path().is_none());
    }

    #[test]
    fn test_load_reports_path_on_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coverage-1.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_process_coverage(&path).unwrap_err();
        assert!(matches!(err, V8CovError::InvalidCoverage { .. }));
        assert!(err.to_string().contains("coverage-1.json"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_process_coverage(Path::new("/nonexistent/coverage.json")).unwrap_err();
        assert!(matches!(err, V8CovError::FileAccess { .. }));
    }
}
