//! Cobertura XML coverage report formatter
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <!DOCTYPE coverage SYSTEM "http://cobertura.sourceforge.net/xml/coverage-04.dtd">
//! <coverage line-rate="0.8" branch-rate="0.7" lines-covered="8" lines-valid="10" ...>
//!   <sources><source>/app</source></sources>
//!   <packages>
//!     <package name="src" line-rate="0.8" branch-rate="0.7" complexity="0">
//!       <classes>
//!         <class name="main.js" filename="src/main.js" line-rate="0.9" ...>
//!           <methods>...</methods>
//!           <lines>
//!             <line number="10" hits="5" branch="false"/>
//!           </lines>
//!         </class>
//!       </classes>
//!     </package>
//!   </packages>
//! </coverage>
//! ```

use super::html::escape_html;
use crate::istanbul::{CoverageMap, FileCoverage, Totals};
use crate::result::V8CovResult;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

/// Files grouped by package (directory relative to the source root)
type PackageMap<'a> = BTreeMap<String, Vec<&'a FileCoverage>>;

/// Cobertura XML format report generator
#[derive(Debug)]
pub struct CoberturaFormatter<'a> {
    map: &'a CoverageMap,
    version: String,
}

impl<'a> CoberturaFormatter<'a> {
    /// Create a new Cobertura formatter
    #[must_use]
    pub fn new(map: &'a CoverageMap) -> Self {
        Self {
            map,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Set the version string
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Generate Cobertura XML report as a string
    #[must_use]
    pub fn generate(&self) -> String {
        let summary = self.map.summary();
        let root = common_root(self.map.files());
        let packages = self.group_by_package(&root);

        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(
            r#"<!DOCTYPE coverage SYSTEM "http://cobertura.sourceforge.net/xml/coverage-04.dtd">"#,
        );
        xml.push('\n');
        let _ = writeln!(
            xml,
            r#"<coverage line-rate="{:.4}" branch-rate="{:.4}" lines-covered="{}" lines-valid="{}" branches-covered="{}" branches-valid="{}" timestamp="{}" complexity="0" version="{}">"#,
            rate(&summary.lines),
            rate(&summary.branches),
            summary.lines.covered,
            summary.lines.total,
            summary.branches.covered,
            summary.branches.total,
            chrono::Utc::now().timestamp_millis(),
            escape_html(&self.version),
        );
        let _ = writeln!(
            xml,
            "  <sources>\n    <source>{}</source>\n  </sources>",
            escape_html(&root)
        );
        xml.push_str("  <packages>\n");

        for (package_name, files) in &packages {
            let mut pkg = crate::istanbul::CoverageSummary::default();
            for file in files {
                pkg.merge(&file.summary());
            }

            let _ = writeln!(
                xml,
                r#"    <package name="{}" line-rate="{:.4}" branch-rate="{:.4}" complexity="0">"#,
                escape_html(package_name),
                rate(&pkg.lines),
                rate(&pkg.branches),
            );
            xml.push_str("      <classes>\n");
            for file in files {
                write_class(&mut xml, file, &root);
            }
            xml.push_str("      </classes>\n");
            xml.push_str("    </package>\n");
        }

        xml.push_str("  </packages>\n");
        xml.push_str("</coverage>\n");

        xml
    }

    /// Save the Cobertura report to a file
    ///
    /// # Errors
    ///
    /// Returns error if file write fails
    pub fn save(&self, path: &Path) -> V8CovResult<()> {
        super::write_file(path, &self.generate())
    }

    /// Group files by package (directory)
    fn group_by_package(&self, root: &str) -> PackageMap<'a> {
        let mut packages: PackageMap<'a> = BTreeMap::new();
        for file in self.map.iter() {
            let relative = relative_path(&file.path, root);
            let package = relative
                .rsplit_once('/')
                .map_or_else(|| "main".to_string(), |(dir, _)| dir.replace('/', "."));
            packages.entry(package).or_default().push(file);
        }
        packages
    }
}

fn write_class(xml: &mut String, file: &FileCoverage, root: &str) {
    let summary = file.summary();
    let relative = relative_path(&file.path, root);
    let class_name = relative.rsplit_once('/').map_or(relative, |(_, name)| name);

    let _ = writeln!(
        xml,
        r#"        <class name="{}" filename="{}" line-rate="{:.4}" branch-rate="{:.4}" complexity="0">"#,
        escape_html(class_name),
        escape_html(relative),
        rate(&summary.lines),
        rate(&summary.branches),
    );

    xml.push_str("          <methods>\n");
    for (func, hits) in file.functions() {
        let _ = writeln!(
            xml,
            r#"            <method name="{}" hits="{hits}" signature="()V">"#,
            escape_html(&func.name)
        );
        let _ = writeln!(
            xml,
            "              <lines><line number=\"{}\" hits=\"{hits}\"/></lines>\n            </method>",
            func.decl.start.line
        );
    }
    xml.push_str("          </methods>\n");

    let mut branch_lines: BTreeMap<u32, (usize, usize)> = BTreeMap::new();
    for (_, branch, arms) in file.branches() {
        let entry = branch_lines.entry(branch.loc.start.line).or_default();
        entry.0 += arms.iter().filter(|&&c| c > 0).count();
        entry.1 += arms.len();
    }

    xml.push_str("          <lines>\n");
    for (line, hits) in file.line_coverage() {
        match branch_lines.get(&line) {
            Some(&(covered, total)) => {
                let pct = if total == 0 { 100 } else { covered * 100 / total };
                let _ = writeln!(
                    xml,
                    r#"            <line number="{line}" hits="{hits}" branch="true" condition-coverage="{pct}% ({covered}/{total})"/>"#,
                );
            }
            None => {
                let _ = writeln!(
                    xml,
                    r#"            <line number="{line}" hits="{hits}" branch="false"/>"#,
                );
            }
        }
    }
    xml.push_str("          </lines>\n");
    xml.push_str("        </class>\n");
}

fn rate(totals: &Totals) -> f64 {
    if totals.total == 0 {
        1.0
    } else {
        totals.covered as f64 / totals.total as f64
    }
}

/// Longest directory prefix shared by every path
pub(crate) fn common_root<'a>(paths: impl Iterator<Item = &'a str>) -> String {
    let mut root: Option<Vec<&str>> = None;
    for path in paths {
        let dirs: Vec<&str> = match path.rsplit_once('/') {
            Some((dir, _)) => dir.split('/').collect(),
            None => Vec::new(),
        };
        root = Some(match root {
            None => dirs,
            Some(current) => current
                .into_iter()
                .zip(dirs)
                .take_while(|(a, b)| a == b)
                .map(|(a, _)| a)
                .collect(),
        });
    }
    root.map(|parts| parts.join("/")).unwrap_or_default()
}

/// Path relative to `root`, or the path itself when outside it
pub(crate) fn relative_path<'p>(path: &'p str, root: &str) -> &'p str {
    if root.is_empty() {
        return path.trim_start_matches('/');
    }
    path.strip_prefix(root)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(path)
}
