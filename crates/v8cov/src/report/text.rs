//! Plain-text reports: the per-file table and the totals summary

use super::cobertura::{common_root, relative_path};
use crate::istanbul::{CoverageMap, CoverageSummary, FileCoverage};
use std::collections::BTreeMap;
use std::fmt::Write;

const SUMMARY_BANNER: &str =
    "=============================== Coverage summary ===============================";
const RULE_WIDTH: usize = 80;

const HEADERS: [&str; 6] = [
    "File",
    "% Stmts",
    "% Branch",
    "% Funcs",
    "% Lines",
    "Uncovered Line #s",
];

/// Totals block printed by `text-summary`
#[must_use]
pub fn render_text_summary(summary: &CoverageSummary) -> String {
    let mut out = String::from("\n");
    out.push_str(SUMMARY_BANNER);
    out.push('\n');
    for (key, totals) in summary.metrics() {
        let mut label = key[..1].to_uppercase();
        label.push_str(&key[1..]);
        let _ = write!(
            out,
            "{label:<12} : {}% ( {}/{} )",
            totals.pct, totals.covered, totals.total
        );
        if totals.skipped > 0 {
            let _ = write!(out, ", {} ignored", totals.skipped);
        }
        out.push('\n');
    }
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push('\n');
    out
}

/// Collapse sorted line numbers into ranges: `3-5,9`
#[must_use]
pub fn format_line_ranges(lines: &[u32]) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut iter = lines.iter().copied().peekable();
    while let Some(start) = iter.next() {
        let mut end = start;
        while iter.peek() == Some(&(end + 1)) {
            end += 1;
            iter.next();
        }
        if start == end {
            parts.push(start.to_string());
        } else {
            parts.push(format!("{start}-{end}"));
        }
    }
    parts.join(",")
}

struct Row {
    name: String,
    summary: CoverageSummary,
    uncovered: String,
}

impl Row {
    fn cells(&self) -> [String; 6] {
        let s = &self.summary;
        [
            self.name.clone(),
            s.statements.pct.to_string(),
            s.branches.pct.to_string(),
            s.functions.pct.to_string(),
            s.lines.pct.to_string(),
            self.uncovered.clone(),
        ]
    }
}

fn file_row(file: &FileCoverage, name: String) -> Row {
    Row {
        name,
        summary: file.summary(),
        uncovered: format_line_ranges(&file.uncovered_lines()),
    }
}

fn build_rows(map: &CoverageMap) -> Vec<Row> {
    let root = common_root(map.files());
    let mut dirs: BTreeMap<&str, Vec<(&str, &FileCoverage)>> = BTreeMap::new();
    for file in map.iter() {
        let relative = relative_path(&file.path, &root);
        let (dir, name) = relative.rsplit_once('/').unwrap_or(("", relative));
        dirs.entry(dir).or_default().push((name, file));
    }

    let mut rows = vec![Row {
        name: "All files".to_string(),
        summary: map.summary(),
        uncovered: String::new(),
    }];

    if dirs.len() == 1 && dirs.contains_key("") {
        for (name, file) in dirs.values().flatten() {
            rows.push(file_row(file, format!(" {name}")));
        }
        return rows;
    }

    for (dir, files) in &dirs {
        let mut summary = CoverageSummary::default();
        for (_, file) in files {
            summary.merge(&file.summary());
        }
        let label = if dir.is_empty() { "." } else { dir };
        rows.push(Row {
            name: format!(" {label}"),
            summary,
            uncovered: String::new(),
        });
        for (name, file) in files {
            rows.push(file_row(file, format!("  {name}")));
        }
    }
    rows
}

/// Istanbul-style coverage table
#[must_use]
pub fn render_text(map: &CoverageMap) -> String {
    let rows: Vec<[String; 6]> = build_rows(map).iter().map(Row::cells).collect();

    let mut widths = HEADERS.map(str::len);
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let separator = widths
        .iter()
        .enumerate()
        .map(|(i, w)| "-".repeat(if i == 0 { w + 1 } else { w + 2 }))
        .collect::<Vec<_>>()
        .join("|");

    let format_row = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (cell, w))| match i {
                0 => format!("{cell:<w$} "),
                5 => format!(" {cell:<w$} "),
                _ => format!(" {cell:>w$} "),
            })
            .collect::<Vec<_>>()
            .join("|")
    };

    let mut out = String::new();
    let _ = writeln!(out, "{separator}");
    let _ = writeln!(out, "{}", format_row(&HEADERS.map(String::from)[..]));
    let _ = writeln!(out, "{separator}");
    for cells in &rows {
        let _ = writeln!(out, "{}", format_row(&cells[..]));
    }
    let _ = writeln!(out, "{separator}");
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::istanbul::tests::sample_file;
    use crate::istanbul::Totals;

    #[test]
    fn test_summary_exact_output() {
        let summary = CoverageSummary {
            statements: Totals::new(6, 7),
            branches: Totals::new(0, 0),
            functions: Totals::new(1, 2),
            lines: Totals::new(6, 7),
        };
        let expected = "\n\
=============================== Coverage summary ===============================\n\
Statements   : 85.71% ( 6/7 )\n\
Branches     : 100% ( 0/0 )\n\
Functions    : 50% ( 1/2 )\n\
Lines        : 85.71% ( 6/7 )\n\
================================================================================\n";
        assert_eq!(render_text_summary(&summary), expected);
    }

    #[test]
    fn test_summary_reports_skipped() {
        let mut summary = CoverageSummary::default();
        summary.merge(&CoverageSummary::default());
        summary.lines.skipped = 2;
        assert!(render_text_summary(&summary).contains("Lines        : 100% ( 0/0 ), 2 ignored"));
    }

    #[test]
    fn test_empty_map_is_unknown() {
        let map = CoverageMap::new();
        let summary = render_text_summary(&map.summary());
        assert!(summary.contains("Statements   : Unknown% ( 0/0 )"));
        assert!(summary.contains("Branches     : Unknown% ( 0/0 )"));

        let table = render_text(&map);
        assert!(table
            .lines()
            .any(|l| l.starts_with("All files |") && l.contains("Unknown")));
    }

    #[test]
    fn test_banner_width() {
        assert_eq!(SUMMARY_BANNER.len(), RULE_WIDTH);
    }

    #[test]
    fn test_line_ranges() {
        assert_eq!(format_line_ranges(&[3, 4, 5, 9]), "3-5,9");
        assert_eq!(format_line_ranges(&[1]), "1");
        assert_eq!(format_line_ranges(&[]), "");
        assert_eq!(format_line_ranges(&[2, 4, 5]), "2,4-5");
    }

    #[test]
    fn test_table_single_directory() {
        let map: CoverageMap = vec![
            sample_file("/app/a.js", [1, 0, 0]),
            sample_file("/app/b.js", [1, 1, 1]),
        ]
        .into_iter()
        .collect();
        let table = render_text(&map);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(
            lines[1],
            "File      | % Stmts | % Branch | % Funcs | % Lines | Uncovered Line #s "
        );
        assert!(lines[0].starts_with("----------|---------|"));
        assert!(lines[3].starts_with("All files |   66.66 |       50 |     100 |   66.66 |"));
        assert!(lines[4].starts_with(" a.js     |   33.33 |        0 |     100 |   33.33 | 2-3"));
        assert!(lines[5].starts_with(" b.js     |     100 |      100 |     100 |     100 |"));
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn test_table_groups_directories() {
        let map: CoverageMap = vec![
            sample_file("/app/src/a.js", [1, 1, 1]),
            sample_file("/app/lib/b.js", [0, 0, 0]),
        ]
        .into_iter()
        .collect();
        let table = render_text(&map);
        let names: Vec<&str> = table
            .lines()
            .skip(3)
            .filter_map(|l| l.split('|').next())
            .map(str::trim_end)
            .collect();
        assert_eq!(names, vec!["All files", " lib", "  b.js", " src", "  a.js", "----------"]);
    }
}
