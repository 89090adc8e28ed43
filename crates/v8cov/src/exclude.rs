//! Glob-based path exclusion
//!
//! Patterns match the whole script path. `*` is the only wildcard and it
//! crosses `/`, so `**/node_modules/**` drops every file below any
//! `node_modules` directory. Every other character is literal: `?`, `[`,
//! `]`, `{` and `}` match themselves, which keeps route folders such as
//! `pages/[id]` excludable.

use crate::result::{V8CovError, V8CovResult};
use glob::{MatchOptions, Pattern};

/// Exclude pattern applied when none are given
pub const DEFAULT_EXCLUDE: &str = "**/node_modules/**";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A compiled set of exclude globs
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    patterns: Vec<Pattern>,
}

impl ExcludeSet {
    /// Compile a list of globs
    pub fn new<I, S>(patterns: I) -> V8CovResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| compile(p.as_ref()))
            .collect::<V8CovResult<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Set that excludes nothing
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set holding only [`DEFAULT_EXCLUDE`]
    #[must_use]
    pub fn default_set() -> Self {
        Self {
            patterns: compile(DEFAULT_EXCLUDE).into_iter().collect(),
        }
    }

    /// Number of patterns
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the set has no patterns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether any pattern matches the path
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_with(path, MATCH_OPTIONS))
    }
}

fn compile(pattern: &str) -> V8CovResult<Pattern> {
    let mut glob = String::with_capacity(pattern.len() * 2);
    for (i, literal) in pattern.split('*').enumerate() {
        if i > 0 && !glob.ends_with('*') {
            glob.push('*');
        }
        glob.push_str(&Pattern::escape(literal));
    }
    Pattern::new(&glob).map_err(|e| V8CovError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.msg.to_string(),
    })
}
