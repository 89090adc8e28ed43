//! Istanbul coverage map
//!
//! The file-keyed coverage structure consumed by Istanbul-compatible
//! tooling. Serializes to the same JSON as `istanbul-lib-coverage`:
//!
//! ```text
//! { "/app/src/main.js": { "path": "/app/src/main.js", "all": false,
//!                         "statementMap": { "0": {start, end} }, "s": { "0": 1 },
//!                         "branchMap": {...}, "b": { "0": [1] },
//!                         "fnMap": {...}, "f": { "0": 1 } } }
//! ```

mod merge;
mod summary;

pub use summary::{CoverageSummary, Pct, Totals, WatermarkLevel, Watermarks};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A position in a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// 1-based line
    pub line: u32,
    /// 0-based column
    pub column: u32,
}

impl Position {
    /// Create a position
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A span between two positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    /// Inclusive start
    pub start: Position,
    /// End position
    pub end: Position,
}

impl Range {
    /// Create a range
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Identity used when merging coverage from several runs
    #[must_use]
    pub fn key(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}

/// A function entry of `fnMap`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionMapping {
    /// Function name
    pub name: String,
    /// Declaration span
    pub decl: Range,
    /// Body span
    pub loc: Range,
    /// Start line
    pub line: u32,
}

/// A branch entry of `branchMap`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchMapping {
    /// Branch kind, `branch` for V8 block ranges
    #[serde(rename = "type")]
    pub kind: String,
    /// Start line
    pub line: u32,
    /// Whole branch span
    pub loc: Range,
    /// One span per arm
    pub locations: Vec<Range>,
}

/// Coverage of a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCoverage {
    /// Absolute source path
    pub path: String,
    /// Whether this entry is a placeholder for a file that never loaded
    #[serde(default)]
    pub all: bool,
    /// Statement spans
    pub statement_map: BTreeMap<u32, Range>,
    /// Statement hits
    pub s: BTreeMap<u32, u64>,
    /// Branch spans
    pub branch_map: BTreeMap<u32, BranchMapping>,
    /// Branch hits, one per arm
    pub b: BTreeMap<u32, Vec<u64>>,
    /// Function spans
    pub fn_map: BTreeMap<u32, FunctionMapping>,
    /// Function hits
    pub f: BTreeMap<u32, u64>,
}

impl FileCoverage {
    /// Empty coverage for a path
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            all: false,
            statement_map: BTreeMap::new(),
            s: BTreeMap::new(),
            branch_map: BTreeMap::new(),
            b: BTreeMap::new(),
            fn_map: BTreeMap::new(),
            f: BTreeMap::new(),
        }
    }

    /// Hits per line: the highest statement count starting on each line
    #[must_use]
    pub fn line_coverage(&self) -> BTreeMap<u32, u64> {
        let mut lines = BTreeMap::new();
        for (id, range) in &self.statement_map {
            let count = self.s.get(id).copied().unwrap_or(0);
            lines
                .entry(range.start.line)
                .and_modify(|c: &mut u64| *c = (*c).max(count))
                .or_insert(count);
        }
        lines
    }

    /// Lines with statements that never ran
    #[must_use]
    pub fn uncovered_lines(&self) -> Vec<u32> {
        self.line_coverage()
            .into_iter()
            .filter(|&(_, count)| count == 0)
            .map(|(line, _)| line)
            .collect()
    }

    /// Functions as (mapping, hits) pairs in id order
    pub fn functions(&self) -> impl Iterator<Item = (&FunctionMapping, u64)> {
        self.fn_map
            .iter()
            .map(|(id, m)| (m, self.f.get(id).copied().unwrap_or(0)))
    }

    /// Branches as (id, mapping, hits) in id order
    pub fn branches(&self) -> impl Iterator<Item = (u32, &BranchMapping, &[u64])> {
        self.branch_map.iter().map(|(id, m)| {
            let hits = self.b.get(id).map_or(&[][..], Vec::as_slice);
            (*id, m, hits)
        })
    }

    /// Metric totals for this file
    #[must_use]
    pub fn summary(&self) -> CoverageSummary {
        CoverageSummary::from_file(self)
    }
}

/// Coverage for a set of files, keyed by path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoverageMap {
    files: BTreeMap<String, FileCoverage>,
}

impl CoverageMap {
    /// Empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one file, merging with any coverage already held for its path
    pub fn add_file_coverage(&mut self, coverage: FileCoverage) {
        match self.files.get_mut(&coverage.path) {
            Some(existing) => existing.merge(&coverage),
            None => {
                self.files.insert(coverage.path.clone(), coverage);
            }
        }
    }

    /// Merge every file of another map into this one
    pub fn merge(&mut self, other: Self) {
        for (_, coverage) in other.files {
            self.add_file_coverage(coverage);
        }
    }

    /// Coverage for one path
    #[must_use]
    pub fn file_coverage(&self, path: &str) -> Option<&FileCoverage> {
        self.files.get(path)
    }

    /// Paths in sorted order
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// File coverages in path order
    pub fn iter(&self) -> impl Iterator<Item = &FileCoverage> {
        self.files.values()
    }

    /// Number of files
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the map holds no files
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Totals across every file
    #[must_use]
    pub fn summary(&self) -> CoverageSummary {
        let mut total = CoverageSummary::default();
        for file in self.files.values() {
            total.merge(&file.summary());
        }
        total
    }
}

impl FromIterator<FileCoverage> for CoverageMap {
    fn from_iter<T: IntoIterator<Item = FileCoverage>>(iter: T) -> Self {
        let mut map = Self::new();
        for coverage in iter {
            map.add_file_coverage(coverage);
        }
        map
    }
}
