//! V8 → Istanbul conversion
//!
//! Every line starts out executed. Each V8 range then overwrites the count
//! of the lines it fully contains, in order, so a nested range with count 0
//! zeroes the body of a function that never ran while the enclosing
//! script range keeps the rest at 1. Named functions become `fnMap`
//! entries; block-granular ranges become single-arm branches.

use crate::istanbul::{BranchMapping, FileCoverage, FunctionMapping, Position, Range};
use crate::result::{V8CovError, V8CovResult};
use crate::source::SourceLines;
use crate::v8::FunctionCoverage;
use std::path::Path;

#[derive(Debug, Clone)]
struct CovSpan {
    start_line: u32,
    start_col: u32,
    end_line: u32,
    end_col: u32,
    count: u64,
}

impl CovSpan {
    fn range(&self) -> Range {
        Range::new(
            Position::new(self.start_line, self.start_col),
            Position::new(self.end_line, self.end_col),
        )
    }
}

/// Converter for a single script
#[derive(Debug, Clone)]
pub struct V8ToIstanbul {
    path: String,
    source: SourceLines,
    branches: Vec<CovSpan>,
    functions: Vec<(String, CovSpan)>,
}

impl V8ToIstanbul {
    /// Create a converter from a script path and its source text
    #[must_use]
    pub fn new(path: impl Into<String>, source: &str) -> Self {
        Self {
            path: path.into(),
            source: SourceLines::new(source),
            branches: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// Read the script source from disk
    pub async fn load(path: impl Into<String>) -> V8CovResult<Self> {
        let path = path.into();
        let source = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| V8CovError::file_access(&path, e))?;
        Ok(Self::new(path, &source))
    }

    /// Script path
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Apply V8 function coverage to the line table
    pub fn apply_coverage(&mut self, blocks: &[FunctionCoverage]) -> V8CovResult<()> {
        let eof = self.source.eof();

        for block in blocks {
            for (i, range) in block.ranges.iter().enumerate() {
                let start_col = range.start_offset;
                let end_col = range.end_offset.min(eof);

                let affected =
                    self.source
                        .overlapping(start_col, end_col)
                        .ok_or(V8CovError::RangeOutOfBounds {
                            start: range.start_offset,
                            end: range.end_offset,
                            eof,
                        })?;

                let lines = self.source.lines();
                let first = &lines[affected.start];
                let last = &lines[affected.end - 1];
                let span = CovSpan {
                    start_line: first.line,
                    start_col: start_col.saturating_sub(first.start_col),
                    end_line: last.line,
                    end_col: end_col.saturating_sub(last.start_col),
                    count: range.count,
                };

                if block.is_block_coverage {
                    if let (Some(name), 0) = (block.name(), i) {
                        self.functions.push((name.to_string(), span.clone()));
                    }
                    self.branches.push(span);
                } else if let Some(name) = block.name() {
                    self.functions.push((name.to_string(), span));
                }

                for line in &mut self.source.lines_mut()[affected] {
                    if start_col <= line.start_col && end_col >= line.end_col && !line.ignore {
                        line.count = range.count;
                    }
                }
            }
        }
        Ok(())
    }

    fn is_line_ignored(&self, line: u32) -> bool {
        self.source.get(line).map_or(true, |l| l.ignore)
    }

    /// Produce Istanbul file coverage
    #[must_use]
    pub fn to_istanbul(&self) -> FileCoverage {
        let mut fc = FileCoverage::new(self.path.clone());

        for (index, line) in self.source.lines().iter().enumerate() {
            if line.ignore {
                continue;
            }
            let id = index as u32;
            fc.statement_map.insert(
                id,
                Range::new(
                    Position::new(line.line, 0),
                    Position::new(line.line, line.len()),
                ),
            );
            fc.s.insert(id, line.count);
        }

        for (index, branch) in self.branches.iter().enumerate() {
            let id = index as u32;
            let loc = branch.range();
            fc.branch_map.insert(
                id,
                BranchMapping {
                    kind: "branch".to_string(),
                    line: branch.start_line,
                    loc,
                    locations: vec![loc],
                },
            );
            let count = if self.is_line_ignored(branch.start_line) {
                1
            } else {
                branch.count
            };
            fc.b.insert(id, vec![count]);
        }

        for (index, (name, func)) in self.functions.iter().enumerate() {
            let id = index as u32;
            let loc = func.range();
            fc.fn_map.insert(
                id,
                FunctionMapping {
                    name: name.clone(),
                    decl: loc,
                    loc,
                    line: func.start_line,
                },
            );
            let count = if self.is_line_ignored(func.start_line) {
                1
            } else {
                func.count
            };
            fc.f.insert(id, count);
        }

        fc
    }
}

/// Load a script from disk and convert its V8 coverage
pub async fn convert_script(
    path: impl Into<String>,
    functions: &[FunctionCoverage],
) -> V8CovResult<FileCoverage> {
    let mut converter = V8ToIstanbul::load(path).await?;
    converter.apply_coverage(functions)?;
    Ok(converter.to_istanbul())
}

/// Convert coverage for a script whose source is already in memory
pub fn convert_source(
    path: &Path,
    source: &str,
    functions: &[FunctionCoverage],
) -> V8CovResult<FileCoverage> {
    let mut converter = V8ToIstanbul::new(path.to_string_lossy(), source);
    converter.apply_coverage(functions)?;
    Ok(converter.to_istanbul())
}
