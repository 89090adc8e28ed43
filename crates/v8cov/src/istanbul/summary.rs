//! Coverage summaries and watermarks

use super::FileCoverage;
use serde::{Deserialize, Serialize};

/// A metric percentage; `Unknown` until any file has been summarized
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PctRepr", into = "PctRepr")]
pub enum Pct {
    /// Percentage truncated to two decimals
    Known(f64),
    /// Summary of an empty coverage map
    Unknown,
}

impl Pct {
    /// Numeric value, if known
    #[must_use]
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Known(pct) => Some(pct),
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for Pct {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(pct) => write!(f, "{pct}"),
            Self::Unknown => f.write_str("Unknown"),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum PctRepr {
    Number(f64),
    Text(String),
}

impl From<PctRepr> for Pct {
    fn from(repr: PctRepr) -> Self {
        match repr {
            PctRepr::Number(pct) => Self::Known(pct),
            PctRepr::Text(_) => Self::Unknown,
        }
    }
}

impl From<Pct> for PctRepr {
    fn from(pct: Pct) -> Self {
        match pct {
            Pct::Known(pct) => Self::Number(pct),
            Pct::Unknown => Self::Text("Unknown".to_string()),
        }
    }
}

/// Covered/total counts for one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Number of items
    pub total: u64,
    /// Items hit at least once
    pub covered: u64,
    /// Items excluded from coverage
    pub skipped: u64,
    /// Percentage covered
    pub pct: Pct,
}

/// Blank totals: nothing summarized yet, so the percentage is unknown
impl Default for Totals {
    fn default() -> Self {
        Self {
            total: 0,
            covered: 0,
            skipped: 0,
            pct: Pct::Unknown,
        }
    }
}

impl Totals {
    /// Totals with a computed percentage
    #[must_use]
    pub fn new(covered: u64, total: u64) -> Self {
        Self {
            total,
            covered,
            skipped: 0,
            pct: Pct::Known(percent(covered, total)),
        }
    }

    /// Add another set of totals
    pub fn merge(&mut self, other: &Self) {
        self.total += other.total;
        self.covered += other.covered;
        self.skipped += other.skipped;
        self.pct = Pct::Known(percent(self.covered, self.total));
    }
}

/// Percentage truncated (not rounded) to two decimals; 100 when there is nothing to cover
#[must_use]
pub fn percent(covered: u64, total: u64) -> f64 {
    if total == 0 {
        return 100.0;
    }
    let scaled = (100_000.0 * covered as f64) / total as f64;
    (scaled / 10.0).floor() / 100.0
}

/// Totals for every metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    /// Line metric
    pub lines: Totals,
    /// Statement metric
    pub statements: Totals,
    /// Function metric
    pub functions: Totals,
    /// Branch metric, counting every arm
    pub branches: Totals,
}

impl CoverageSummary {
    /// Summarize one file
    #[must_use]
    pub fn from_file(fc: &FileCoverage) -> Self {
        let lines = fc.line_coverage();
        let line_hits = lines.values().filter(|&&c| c > 0).count() as u64;

        let stmt_hits = fc.s.values().filter(|&&c| c > 0).count() as u64;
        let fn_hits = fc.f.values().filter(|&&c| c > 0).count() as u64;

        let (arm_total, arm_hits) = fc.b.values().fold((0u64, 0u64), |(t, h), arms| {
            (
                t + arms.len() as u64,
                h + arms.iter().filter(|&&c| c > 0).count() as u64,
            )
        });

        Self {
            lines: Totals::new(line_hits, lines.len() as u64),
            statements: Totals::new(stmt_hits, fc.s.len() as u64),
            functions: Totals::new(fn_hits, fc.f.len() as u64),
            branches: Totals::new(arm_hits, arm_total),
        }
    }

    /// Add another summary
    pub fn merge(&mut self, other: &Self) {
        self.lines.merge(&other.lines);
        self.statements.merge(&other.statements);
        self.functions.merge(&other.functions);
        self.branches.merge(&other.branches);
    }

    /// Metrics in report column order
    #[must_use]
    pub fn metrics(&self) -> [(&'static str, &Totals); 4] {
        [
            ("statements", &self.statements),
            ("branches", &self.branches),
            ("functions", &self.functions),
            ("lines", &self.lines),
        ]
    }
}

/// How healthy a percentage is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatermarkLevel {
    /// Below the low mark
    Low,
    /// Between the marks
    Medium,
    /// At or above the high mark
    High,
}

impl WatermarkLevel {
    /// CSS class name used by the HTML report
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Low/high thresholds per metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Watermarks {
    /// Statement thresholds
    pub statements: [f64; 2],
    /// Function thresholds
    pub functions: [f64; 2],
    /// Branch thresholds
    pub branches: [f64; 2],
    /// Line thresholds
    pub lines: [f64; 2],
}

impl Default for Watermarks {
    fn default() -> Self {
        Self {
            statements: [50.0, 80.0],
            functions: [50.0, 80.0],
            branches: [50.0, 80.0],
            lines: [50.0, 80.0],
        }
    }
}

impl Watermarks {
    /// Classify a metric percentage; an unknown one sits between the marks
    #[must_use]
    pub fn classify(&self, metric: &str, pct: Pct) -> WatermarkLevel {
        let Some(pct) = pct.value() else {
            return WatermarkLevel::Medium;
        };
        let [low, high] = match metric {
            "statements" => self.statements,
            "functions" => self.functions,
            "branches" => self.branches,
            _ => self.lines,
        };
        if pct < low {
            WatermarkLevel::Low
        } else if pct >= high {
            WatermarkLevel::High
        } else {
            WatermarkLevel::Medium
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::super::tests::sample_file;
    use super::*;

    #[test]
    fn test_percent_truncates() {
        assert_eq!(percent(6, 7), 85.71);
        assert_eq!(percent(2, 3), 66.66);
        assert_eq!(percent(1, 3), 33.33);
        assert_eq!(percent(3, 3), 100.0);
        assert_eq!(percent(0, 0), 100.0);
        assert_eq!(percent(0, 5), 0.0);
    }

    #[test]
    fn test_file_summary() {
        let summary = sample_file("/a.js", [1, 0, 2]).summary();
        assert_eq!(summary.statements.total, 3);
        assert_eq!(summary.statements.covered, 2);
        assert_eq!(summary.lines.covered, 2);
        assert_eq!(summary.functions.covered, 1);
        assert_eq!(summary.branches.total, 1);
        assert_eq!(summary.branches.covered, 0);
        assert_eq!(summary.branches.pct, Pct::Known(0.0));
    }

    #[test]
    fn test_summary_merge_recomputes_pct() {
        let mut total = sample_file("/a.js", [1, 1, 1]).summary();
        total.merge(&sample_file("/b.js", [0, 0, 0]).summary());
        assert_eq!(total.statements.total, 6);
        assert_eq!(total.statements.covered, 3);
        assert_eq!(total.statements.pct, Pct::Known(50.0));
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(Totals::new(1, 4)).unwrap();
        assert_eq!(json["total"], 4);
        assert_eq!(json["covered"], 1);
        assert_eq!(json["skipped"], 0);
        assert_eq!(json["pct"], 25.0);
    }

    #[test]
    fn test_blank_totals_are_unknown() {
        let blank = CoverageSummary::default();
        assert_eq!(blank.lines.pct, Pct::Unknown);
        assert_eq!(blank.lines.pct.to_string(), "Unknown");
        assert_eq!(serde_json::to_value(blank.lines).unwrap()["pct"], "Unknown");

        let mut merged = CoverageSummary::default();
        merged.merge(&CoverageSummary::default());
        assert_eq!(merged.branches.pct, Pct::Known(100.0));
    }

    #[test]
    fn test_pct_reads_back() {
        let totals: Totals =
            serde_json::from_str(r#"{"total":0,"covered":0,"skipped":0,"pct":"Unknown"}"#).unwrap();
        assert_eq!(totals.pct, Pct::Unknown);
        let totals: Totals =
            serde_json::from_str(r#"{"total":4,"covered":1,"skipped":0,"pct":25}"#).unwrap();
        assert_eq!(totals.pct, Pct::Known(25.0));
    }

    #[test]
    fn test_watermarks() {
        let marks = Watermarks::default();
        assert_eq!(marks.classify("lines", Pct::Known(49.99)), WatermarkLevel::Low);
        assert_eq!(marks.classify("lines", Pct::Known(50.0)), WatermarkLevel::Medium);
        assert_eq!(marks.classify("branches", Pct::Known(80.0)), WatermarkLevel::High);
        assert_eq!(marks.classify("branches", Pct::Unknown), WatermarkLevel::Medium);
        assert_eq!(WatermarkLevel::Medium.css_class(), "medium");
    }
}
