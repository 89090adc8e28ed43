//! HTML coverage report
//!
//! `index.html` holds summary cards and a per-file table; each file gets
//! its own page under the output directory, mirroring the source layout,
//! with the annotated source and per-line hit counts.

use super::cobertura::{common_root, relative_path};
use super::write_file;
use crate::istanbul::{CoverageMap, CoverageSummary, FileCoverage, Totals, Watermarks};
use crate::result::V8CovResult;
use std::fmt::Write;
use std::path::{Path, PathBuf};

const STYLE: &str = r#"
        body { font-family: system-ui, sans-serif; margin: 40px; background: #f5f5f5; }
        .container { max-width: 1200px; margin: 0 auto; background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
        h1 { color: #333; border-bottom: 2px solid #4CAF50; padding-bottom: 10px; }
        .summary { display: grid; grid-template-columns: repeat(4, 1fr); gap: 20px; margin: 20px 0; }
        .stat { background: #f9f9f9; padding: 20px; border-radius: 8px; text-align: center; }
        .stat-value { font-size: 2em; font-weight: bold; }
        .stat-label { color: #666; margin-top: 5px; }
        .stat-detail { color: #999; font-size: 0.85em; }
        .timestamp { color: #999; font-size: 0.9em; }
        table { width: 100%; border-collapse: collapse; }
        th, td { padding: 6px 10px; border-bottom: 1px solid #eee; text-align: right; }
        th:first-child, td:first-child { text-align: left; }
        .high { color: #2e7d32; } td.high { background: #e8f5e9; }
        .medium { color: #f9a825; } td.medium { background: #fffde7; }
        .low { color: #c62828; } td.low { background: #ffebee; }
        pre { margin: 0; }
        .source td { padding: 0 8px; border: none; font-family: ui-monospace, monospace; font-size: 13px; text-align: left; }
        .source td.line-no, .source td.hits { text-align: right; color: #999; user-select: none; }
        tr.covered td.code { background: #e8f5e9; }
        tr.uncovered td.code { background: #ffcdd2; }
        tr.neutral td.code { background: white; }
        .missing { color: #c62828; font-style: italic; }
"#;

/// Escape text for HTML element content and attribute values
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Line state shown in the annotated source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    /// At least one hit
    Covered,
    /// Has statements, never ran
    Uncovered,
    /// No statements
    Neutral,
}

impl LineStatus {
    const fn css_class(self) -> &'static str {
        match self {
            Self::Covered => "covered",
            Self::Uncovered => "uncovered",
            Self::Neutral => "neutral",
        }
    }
}

/// HTML report generator
#[derive(Debug)]
pub struct HtmlReport<'a> {
    map: &'a CoverageMap,
    watermarks: Watermarks,
    title: String,
    root: String,
}

impl<'a> HtmlReport<'a> {
    /// Report over a coverage map
    #[must_use]
    pub fn new(map: &'a CoverageMap) -> Self {
        Self {
            map,
            watermarks: Watermarks::default(),
            title: "Code coverage report".to_string(),
            root: common_root(map.files()),
        }
    }

    /// Override the low/high thresholds
    #[must_use]
    pub const fn with_watermarks(mut self, watermarks: Watermarks) -> Self {
        self.watermarks = watermarks;
        self
    }

    /// Page title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Path of a file's page, relative to the report directory
    #[must_use]
    pub fn page_path(&self, file: &FileCoverage) -> String {
        format!("{}.html", relative_path(&file.path, &self.root))
    }

    /// Write `index.html` and one page per file
    pub fn save(&self, dir: &Path) -> V8CovResult<Vec<PathBuf>> {
        let index = dir.join("index.html");
        write_file(&index, &self.render_index())?;
        let mut written = vec![index];

        for file in self.map.iter() {
            let path = dir.join(self.page_path(file));
            write_file(&path, &self.render_file(file))?;
            written.push(path);
        }
        tracing::info!(dir = %dir.display(), pages = written.len(), "wrote HTML report");
        Ok(written)
    }

    /// The index page
    #[must_use]
    pub fn render_index(&self) -> String {
        let summary = self.map.summary();
        let mut body = self.summary_cards(&summary, "");

        body.push_str("        <table>\n            <tr><th>File</th>");
        for (key, _) in summary.metrics() {
            let _ = write!(body, "<th>{}</th>", capitalize(key));
        }
        body.push_str("</tr>\n");

        for file in self.map.iter() {
            let page = self.page_path(file);
            let file_summary = file.summary();
            let _ = write!(
                body,
                r#"            <tr><td><a href="{}">{}</a></td>"#,
                escape_html(&page),
                escape_html(relative_path(&file.path, &self.root)),
            );
            for (key, totals) in file_summary.metrics() {
                let _ = write!(
                    body,
                    r#"<td class="{}">{}% ({}/{})</td>"#,
                    self.watermarks.classify(key, totals.pct).css_class(),
                    totals.pct,
                    totals.covered,
                    totals.total
                );
            }
            body.push_str("</tr>\n");
        }
        body.push_str("        </table>\n");

        self.page(&self.title, &body)
    }

    /// One file's annotated source page
    #[must_use]
    pub fn render_file(&self, file: &FileCoverage) -> String {
        let relative = relative_path(&file.path, &self.root);
        let depth = relative.matches('/').count();
        let index_href = format!("{}index.html", "../".repeat(depth));

        let mut body = format!(
            "        <p><a href=\"{index_href}\">All files</a> / {}</p>\n",
            escape_html(relative)
        );
        body.push_str(&self.summary_cards(&file.summary(), relative));

        match std::fs::read_to_string(&file.path) {
            Ok(source) => body.push_str(&annotated_source(file, &source)),
            Err(e) => {
                tracing::warn!(path = %file.path, error = %e, "source unavailable for HTML report");
                let _ = writeln!(
                    body,
                    r#"        <p class="missing">Unable to read source {}: {}</p>"#,
                    escape_html(&file.path),
                    escape_html(&e.to_string())
                );
            }
        }

        self.page(relative, &body)
    }

    fn summary_cards(&self, summary: &CoverageSummary, heading: &str) -> String {
        let mut html = String::new();
        if !heading.is_empty() {
            let _ = writeln!(html, "        <h2>{}</h2>", escape_html(heading));
        }
        html.push_str("        <div class=\"summary\">\n");
        for (key, totals) in summary.metrics() {
            let _ = writeln!(html, "{}", self.card(key, totals));
        }
        html.push_str("        </div>\n");
        html
    }

    fn card(&self, key: &str, totals: &Totals) -> String {
        format!(
            r#"            <div class="stat"><div class="stat-value {}">{}%</div><div class="stat-label">{}</div><div class="stat-detail">{}/{}</div></div>"#,
            self.watermarks.classify(key, totals.pct).css_class(),
            totals.pct,
            capitalize(key),
            totals.covered,
            totals.total
        )
    }

    fn page(&self, title: &str, body: &str) -> String {
        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLE}    </style>
</head>
<body>
    <div class="container">
        <h1>{heading}</h1>
{body}        <p class="timestamp">Generated by v8cov {version} at {timestamp}</p>
    </div>
</body>
</html>
"#,
            title = escape_html(title),
            heading = escape_html(&self.title),
            version = env!("CARGO_PKG_VERSION"),
        )
    }
}

/// Classify each source line by its hit count
#[must_use]
pub fn line_status(file: &FileCoverage, line_count: usize) -> Vec<(LineStatus, Option<u64>)> {
    let hits = file.line_coverage();
    (1..=line_count as u32)
        .map(|line| match hits.get(&line) {
            Some(&0) => (LineStatus::Uncovered, Some(0)),
            Some(&count) => (LineStatus::Covered, Some(count)),
            None => (LineStatus::Neutral, None),
        })
        .collect()
}

fn annotated_source(file: &FileCoverage, source: &str) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let mut html = String::from("        <table class=\"source\">\n");
    for (i, (status, hits)) in line_status(file, lines.len()).into_iter().enumerate() {
        let hits = hits.map(|h| format!("{h}x")).unwrap_or_default();
        let _ = writeln!(
            html,
            r#"            <tr class="{}"><td class="line-no">{}</td><td class="hits">{hits}</td><td class="code"><pre>{}</pre></td></tr>"#,
            status.css_class(),
            i + 1,
            escape_html(lines[i]),
        );
    }
    html.push_str("        </table>\n");
    html
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
