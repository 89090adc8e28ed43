//! Coverage file discovery

use crate::result::{V8CovError, V8CovResult};
use std::path::{Path, PathBuf};

/// File name prefix V8 uses for coverage output
pub const COVERAGE_FILE_PREFIX: &str = "coverage";

/// Extension of coverage output files
pub const COVERAGE_FILE_SUFFIX: &str = ".json";

/// Whether a file name looks like V8 coverage output (`coverage-*.json`)
#[must_use]
pub fn is_coverage_file_name(name: &str) -> bool {
    name.starts_with(COVERAGE_FILE_PREFIX) && name.ends_with(COVERAGE_FILE_SUFFIX)
}

/// Resolve the coverage path into the list of files to read.
///
/// A directory yields its direct children named `coverage*.json`, sorted by
/// name. Any other path is returned as is.
pub fn find_coverage_files(path: &Path) -> V8CovResult<Vec<PathBuf>> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            V8CovError::CoveragePathNotFound {
                path: path.to_path_buf(),
            }
        } else {
            V8CovError::file_access(path, e)
        }
    })?;

    if !metadata.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let entries = std::fs::read_dir(path).map_err(|e| V8CovError::file_access(path, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| V8CovError::file_access(path, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !is_coverage_file_name(name) {
            continue;
        }
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        files.push(entry.path());
    }
    files.sort();

    tracing::debug!(dir = %path.display(), count = files.len(), "discovered coverage files");
    Ok(files)
}
