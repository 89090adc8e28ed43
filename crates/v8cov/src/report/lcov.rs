//! LCOV report formatter
//!
//! ## LCOV Format
//!
//! ```text
//! TN:<test name>
//! SF:<source file, relative to the project root>
//! FN:<line>,<function name>
//! FNF:<functions found>
//! FNH:<functions hit>
//! FNDA:<execution count>,<function name>
//! DA:<line>,<execution count>
//! LF:<lines found>
//! LH:<lines hit>
//! BRDA:<line>,<block>,<branch>,<hits>
//! BRF:<branches found>
//! BRH:<branches hit>
//! end_of_record
//! ```

use crate::istanbul::{CoverageMap, FileCoverage};
use crate::result::V8CovResult;
use std::fmt::Write;
use std::path::{Component, Path, PathBuf};

/// LCOV format report generator
#[derive(Debug)]
pub struct LcovFormatter<'a> {
    map: &'a CoverageMap,
    test_name: Option<String>,
    project_root: Option<PathBuf>,
}

impl<'a> LcovFormatter<'a> {
    /// Create a new LCOV formatter; `SF` paths are relative to the working directory
    #[must_use]
    pub fn new(map: &'a CoverageMap) -> Self {
        Self {
            map,
            test_name: None,
            project_root: std::env::current_dir().ok(),
        }
    }

    /// Directory `SF` paths are made relative to
    #[must_use]
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    /// Set the test name for the report
    #[must_use]
    pub fn with_test_name(mut self, name: impl Into<String>) -> Self {
        self.test_name = Some(name.into());
        self
    }

    /// Generate LCOV format report as a string
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();
        for file in self.map.iter() {
            self.write_record(&mut output, file);
        }
        output
    }

    /// Save the LCOV report to a file
    ///
    /// # Errors
    ///
    /// Returns error if file write fails
    pub fn save(&self, path: &Path) -> V8CovResult<()> {
        super::write_file(path, &self.generate())
    }

    fn write_record(&self, output: &mut String, file: &FileCoverage) {
        let _ = writeln!(output, "TN:{}", self.test_name.as_deref().unwrap_or(""));
        let source = Path::new(&file.path);
        match &self.project_root {
            Some(root) => {
                let _ = writeln!(output, "SF:{}", relative_to(source, root).display());
            }
            None => {
                let _ = writeln!(output, "SF:{}", file.path);
            }
        }

        // Functions (FN, FNF, FNH, FNDA)
        for (func, _) in file.functions() {
            let _ = writeln!(output, "FN:{},{}", func.decl.start.line, func.name);
        }
        let functions_hit = file.functions().filter(|(_, count)| *count > 0).count();
        let _ = writeln!(output, "FNF:{}", file.fn_map.len());
        let _ = writeln!(output, "FNH:{functions_hit}");
        for (func, count) in file.functions() {
            let _ = writeln!(output, "FNDA:{count},{}", func.name);
        }

        // Line data (DA)
        let lines = file.line_coverage();
        let mut lines_hit = 0;
        for (line, count) in &lines {
            let _ = writeln!(output, "DA:{line},{count}");
            if *count > 0 {
                lines_hit += 1;
            }
        }
        let _ = writeln!(output, "LF:{}", lines.len());
        let _ = writeln!(output, "LH:{lines_hit}");

        // Branches (BRDA)
        let mut branches_found = 0;
        let mut branches_hit = 0;
        for (id, branch, arms) in file.branches() {
            for (arm, count) in arms.iter().enumerate() {
                let _ = writeln!(output, "BRDA:{},{id},{arm},{count}", branch.loc.start.line);
                branches_found += 1;
                if *count > 0 {
                    branches_hit += 1;
                }
            }
        }
        let _ = writeln!(output, "BRF:{branches_found}");
        let _ = writeln!(output, "BRH:{branches_hit}");

        output.push_str("end_of_record\n");
    }
}

/// `path` relative to `root`, climbing out with `..` where needed
///
/// Paths sharing no prefix with `root` are returned unchanged.
fn relative_to(path: &Path, root: &Path) -> PathBuf {
    let path_parts: Vec<Component<'_>> = path.components().collect();
    let root_parts: Vec<Component<'_>> = root.components().collect();
    let shared = path_parts
        .iter()
        .zip(&root_parts)
        .take_while(|(a, b)| a == b)
        .count();
    if shared == 0 {
        return path.to_path_buf();
    }

    let mut relative = PathBuf::new();
    for _ in shared..root_parts.len() {
        relative.push("..");
    }
    for part in &path_parts[shared..] {
        relative.push(part);
    }
    relative
}
