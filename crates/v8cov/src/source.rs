//! Script source line table
//!
//! Splits a script into lines addressed by UTF-16 offsets, the unit V8
//! reports coverage ranges in, and applies `c8`/`v8` ignore hints.

use regex::Regex;
use std::sync::OnceLock;

/// A single source line and its current hit count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CovLine {
    /// 1-based line number
    pub line: u32,
    /// UTF-16 offset of the first character
    pub start_col: u32,
    /// UTF-16 offset just past the last character, newline excluded
    pub end_col: u32,
    /// Hit count; every line starts as executed
    pub count: u64,
    /// Excluded from coverage by an ignore hint
    pub ignore: bool,
}

impl CovLine {
    fn new(line: u32, start_col: u32, text: &str) -> Self {
        let content = text
            .strip_suffix("\r\n")
            .or_else(|| text.strip_suffix('\n'))
            .unwrap_or(text);
        Self {
            line,
            start_col,
            end_col: start_col + utf16_len(content),
            count: 1,
            ignore: false,
        }
    }

    /// Line length in UTF-16 units
    #[must_use]
    pub fn len(&self) -> u32 {
        self.end_col - self.start_col
    }

    /// Whether the line has no content
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end_col == self.start_col
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IgnoreHint {
    /// Ignore this line and the next `n`
    Next(u32),
    Start,
    Stop,
}

struct IgnorePatterns {
    next_count: Regex,
    next_own_line: Regex,
    next_inline: Regex,
    start_stop: Regex,
}

fn ignore_patterns() -> &'static IgnorePatterns {
    static PATTERNS: OnceLock<IgnorePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| IgnorePatterns {
        next_count: compile(r"^\W*/\* (?:[cC]8|v8) ignore next (?P<count>[0-9]+)"),
        next_own_line: compile(r"^\W*/\* (?:[cC]8|v8) ignore next"),
        next_inline: compile(r"/\* (?:[cC]8|v8) ignore next"),
        start_stop: compile(r"/\* (?:[cC]8|v8) ignore (?P<mode>start|stop)"),
    })
}

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("ignore hint pattern is valid")
}

fn parse_ignore(text: &str) -> Option<IgnoreHint> {
    let patterns = ignore_patterns();
    if let Some(caps) = patterns.next_count.captures(text) {
        let count = caps["count"].parse().unwrap_or(u32::MAX);
        return Some(IgnoreHint::Next(count));
    }
    if patterns.next_own_line.is_match(text) {
        return Some(IgnoreHint::Next(1));
    }
    if patterns.next_inline.is_match(text) {
        return Some(IgnoreHint::Next(0));
    }
    patterns
        .start_stop
        .captures(text)
        .map(|caps| match &caps["mode"] {
            "start" => IgnoreHint::Start,
            _ => IgnoreHint::Stop,
        })
}

/// Number of UTF-16 code units in a string
#[must_use]
pub fn utf16_len(s: &str) -> u32 {
    s.chars().map(|c| c.len_utf16() as u32).sum()
}

/// Line table for one script
#[derive(Debug, Clone)]
pub struct SourceLines {
    lines: Vec<CovLine>,
    eof: u32,
}

impl SourceLines {
    /// Build the line table
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut lines = Vec::new();
        let mut position = 0u32;
        let mut ignore_next = 0u32;
        let mut ignore_all = false;

        let chunks: Vec<&str> = if source.is_empty() {
            vec![""]
        } else {
            source.split_inclusive('\n').collect()
        };

        for (i, text) in chunks.into_iter().enumerate() {
            let mut line = CovLine::new(i as u32 + 1, position, text);
            if ignore_next > 0 {
                line.ignore = true;
                ignore_next -= 1;
            } else if ignore_all {
                line.ignore = true;
            }
            position += utf16_len(text);

            if let Some(hint) = parse_ignore(text) {
                line.ignore = true;
                match hint {
                    IgnoreHint::Next(n) => ignore_next = n,
                    IgnoreHint::Start => {
                        ignore_all = true;
                        ignore_next = 0;
                    }
                    IgnoreHint::Stop => {
                        ignore_all = false;
                        ignore_next = 0;
                    }
                }
            }
            lines.push(line);
        }

        Self {
            lines,
            eof: position,
        }
    }

    /// Source length in UTF-16 units
    #[must_use]
    pub fn eof(&self) -> u32 {
        self.eof
    }

    /// All lines in order
    #[must_use]
    pub fn lines(&self) -> &[CovLine] {
        &self.lines
    }

    /// Line by 1-based number
    #[must_use]
    pub fn get(&self, line: u32) -> Option<&CovLine> {
        line.checked_sub(1)
            .and_then(|idx| self.lines.get(idx as usize))
    }

    /// Index range of lines touched by `start..end`
    #[must_use]
    pub fn overlapping(&self, start: u32, end: u32) -> Option<std::ops::Range<usize>> {
        let first = self
            .lines
            .iter()
            .position(|l| start <= l.end_col && end >= l.start_col)?;
        let len = self.lines[first..]
            .iter()
            .take_while(|l| start <= l.end_col && end >= l.start_col)
            .count();
        Some(first..first + len)
    }

    pub(crate) fn lines_mut(&mut self) -> &mut [CovLine] {
        &mut self.lines
    }
}
