//! LCOV trace of the whole project.
//!
//! ## LCOV Format
//!
//! ```text
//! TN:<test name>
//! SF:<source file>
//! FN:<line>,<function name>
//! FNDA:<0|1>,<function name>
//! FNF:<functions found>
//! FNH:<functions hit>
//! BRDA:<line>,<block>,<branch>,<taken or ->
//! BRF:<branches found>
//! BRH:<branches hit>
//! DA:<line>,<0|1>
//! LF:<lines found>
//! LH:<lines hit>
//! end_of_record
//! ```

use super::encoding;
use crate::coverage::is_reported;
use crate::model::{Function, Project, Unit, UnitCoverage};
use crate::result::ReportResult;
use encoding_rs::{Encoding, UTF_8};
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write;
use std::path::Path;
use tracing::debug;

/// LCOV report generator
#[derive(Debug)]
pub struct LcovFormatter<'a> {
    project: &'a Project,
    test_name: String,
    source_root: String,
    project_dir: String,
    encoding: &'static Encoding,
}

/// Records of one source file, before ordering
#[derive(Debug, Default)]
struct FileRecords {
    functions: Vec<(String, String)>,
    functions_found: usize,
    functions_hit: usize,
    branches: Vec<(u32, String)>,
    branches_found: usize,
    branches_hit: usize,
    lines: Vec<(u32, String)>,
    lines_found: usize,
    lines_hit: usize,
}

impl FileRecords {
    fn add_function(&mut self, func: &Function) {
        let name = func.lcov_name();
        let hit = u8::from(func.metrics.has_anything_covered());
        self.functions.push((
            format!("FN:{},{name}", func.start_line),
            format!("FNDA:{hit},{name}"),
        ));
        self.functions_found += 1;
        if func.has_covered_objects {
            self.functions_hit += 1;
        }

        let mut block = 0;
        let mut branch = 0;
        let mut seen: HashSet<u32> = HashSet::new();

        for line in func.lines.iter().filter(|l| l.is_coverage_bearing()) {
            self.lines_found += 1;
            let covered = line.metrics.has_anything_covered();
            if covered {
                self.lines_hit += 1;
            }
            self.lines
                .push((line.number, format!("DA:{},{}", line.number, u8::from(covered))));

            if line.metrics.branch_points() > 0 {
                self.branches_found += 1;
                let new_line = seen.insert(line.number);
                let taken = line.metrics.branches_taken();
                let taken = if taken > 0 {
                    self.branches_hit += 1;
                    taken.to_string()
                } else {
                    "-".to_string()
                };
                self.branches.push((
                    line.number,
                    format!("BRDA:{},{block},{branch},{taken}", line.number),
                ));
                if new_line {
                    block += 1;
                    branch += 1;
                }
            }
        }

        // the function's last line counts as executed unless the last
        // coverage-bearing line is a `return`
        if let Some(last) = func.lines.last() {
            let text = func.last_coverage_line().map_or("", |l| l.text.as_str());
            if !text.contains("return") {
                self.lines.push((last.number, format!("DA:{},1", last.number)));
            }
        }
    }

    fn write(mut self, out: &mut String) {
        for (fn_record, fnda_record) in &self.functions {
            let _ = writeln!(out, "{fn_record}");
            let _ = writeln!(out, "{fnda_record}");
        }
        let _ = writeln!(out, "FNF:{}", self.functions_found);
        let _ = writeln!(out, "FNH:{}", self.functions_hit);

        self.branches.sort_by_key(|(number, _)| *number);
        for (_, record) in &self.branches {
            let _ = writeln!(out, "{record}");
        }
        let _ = writeln!(out, "BRF:{}", self.branches_found);
        let _ = writeln!(out, "BRH:{}", self.branches_hit);

        self.lines.sort_by_key(|(number, _)| *number);
        for (_, record) in &self.lines {
            let _ = writeln!(out, "{record}");
        }
        let _ = writeln!(out, "LF:{}", self.lines_found);
        let _ = writeln!(out, "LH:{}", self.lines_hit);
        out.push_str("end_of_record\n");
    }
}

/// Display path without its extension, relative to `project_dir` when it
/// lies below it
fn relative_key(display_path: &str, project_dir: &str) -> String {
    let path = display_path.replace('\\', "/");
    let stem = match path.rsplit_once('.') {
        Some((stem, ext)) if !ext.contains('/') => stem,
        _ => path.as_str(),
    };
    let root = project_dir.replace('\\', "/");
    let root = root.trim_end_matches('/');
    if !root.is_empty() {
        if let Some(rest) = stem.strip_prefix(root).and_then(|r| r.strip_prefix('/')) {
            return rest.to_string();
        }
    }
    stem.to_string()
}

impl<'a> LcovFormatter<'a> {
    /// Create a formatter; the test name defaults to the project name
    #[must_use]
    pub fn new(project: &'a Project) -> Self {
        Self {
            project,
            test_name: project.name.clone(),
            source_root: String::new(),
            project_dir: String::new(),
            encoding: UTF_8,
        }
    }

    /// Set the `TN:` test name
    #[must_use]
    pub fn with_test_name(mut self, name: impl Into<String>) -> Self {
        self.test_name = name.into();
        self
    }

    /// Set the root prefixed to every `SF:` path
    #[must_use]
    pub fn with_source_root(mut self, root: impl Into<String>) -> Self {
        self.source_root = root.into();
        self
    }

    /// Set the directory file paths are made relative to
    #[must_use]
    pub fn with_project_dir(mut self, dir: impl Into<String>) -> Self {
        self.project_dir = dir.into();
        self
    }

    /// Set the output encoding
    #[must_use]
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Reported files with coverage, keyed by project-relative path. A later
    /// unit with the same key replaces an earlier one.
    fn files(&self) -> BTreeMap<String, (&'a Unit, &'a UnitCoverage)> {
        let mut files = BTreeMap::new();
        for env in &self.project.environments {
            for unit in &env.units {
                if unit.display_name.is_empty() || !is_reported(env, unit) {
                    continue;
                }
                let Some(coverage) = unit.coverage.as_ref() else {
                    continue;
                };
                if !coverage.metrics.has_any_coverage() {
                    debug!(unit = %unit.name, "no coverage, not traced");
                    continue;
                }
                files.insert(
                    relative_key(&unit.display_path, &self.project_dir),
                    (unit, coverage),
                );
            }
        }
        files
    }

    fn source_file(&self, key: &str, unit: &Unit) -> String {
        let dir = key.rsplit_once('/').map_or("", |(dir, _)| dir);
        let joined = [self.source_root.as_str(), dir]
            .iter()
            .map(|part| part.trim_end_matches(['/', '\\']))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("/")
            .replace('\\', "/");
        if joined.is_empty() {
            unit.display_name.clone()
        } else {
            format!("{joined}/{}", unit.display_name)
        }
    }

    /// Generate the trace text
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();
        for (key, (unit, coverage)) in self.files() {
            let _ = writeln!(output, "TN:{}", self.test_name);
            let _ = writeln!(output, "SF:{}", self.source_file(&key, unit));

            let mut records = FileRecords::default();
            for func in &coverage.functions {
                records.add_function(func);
            }
            records.write(&mut output);
        }
        output
    }

    /// Write the trace
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn save(&self, path: &Path) -> ReportResult<()> {
        encoding::write_report(path, &self.generate(), self.encoding)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fixtures::{environment, function, line, project, statements, unit};
    use crate::model::{Counter, CoverageKinds, EnvironmentKind, Metrics};
    use proptest::prelude::*;

    fn branchy(covered: u64, total: u64) -> Metrics {
        statements(1, 1).with_branches(Counter::of(covered, total))
    }

    #[test]
    fn test_relative_key() {
        assert_eq!(relative_key("/work/src/manager.c", "/work"), "src/manager");
        assert_eq!(relative_key("/work/src/manager.c", "/work/"), "src/manager");
        assert_eq!(relative_key("C:\\work\\a.b\\x.c", "C:/work"), "a.b/x");
        assert_eq!(relative_key("/elsewhere/x.c", "/work"), "/elsewhere/x");
        assert_eq!(relative_key("/work/src/Makefile", "/work"), "src/Makefile");
    }

    #[test]
    fn test_single_file_records() {
        let mut last = line(12, statements(1, 1));
        last.text = "return x;".to_string();
        let func = function(
            "Add_Party",
            0,
            2,
            vec![
                line(10, statements(1, 1)),
                line(11, branchy(1, 2)),
                line(11, branchy(0, 2)),
                last,
            ],
        );
        let p = project(vec![environment("ENV", None, vec![unit("manager", None, vec![func])])]);
        let text = LcovFormatter::new(&p)
            .with_project_dir("/work")
            .with_source_root("/ci/root")
            .generate();

        assert_eq!(
            text,
            "TN:Demo\n\
             SF:/ci/root/src/manager.c\n\
             FN:10,Add_Party(void)\n\
             FNDA:1,Add_Party(void)\n\
             FNF:1\n\
             FNH:1\n\
             BRDA:11,0,0,1\n\
             BRDA:11,1,1,-\n\
             BRF:2\n\
             BRH:1\n\
             DA:10,1\n\
             DA:11,1\n\
             DA:11,1\n\
             DA:12,1\n\
             LF:4\n\
             LH:4\n\
             end_of_record\n"
        );
    }

    #[test]
    fn test_trailing_line_without_return_is_counted() {
        let func = function(
            "f",
            0,
            1,
            vec![line(5, statements(1, 1)), line(6, statements(0, 1))],
        );
        let p = project(vec![environment("ENV", None, vec![unit("u", None, vec![func])])]);
        let text = LcovFormatter::new(&p).generate();
        assert!(text.contains("DA:6,0\nDA:6,1\nLF:2\nLH:1\n"));
        assert!(text.contains("SF:/work/src/u.c\n"));
    }

    #[test]
    fn test_trailing_plain_line_takes_the_executed_record() {
        let mut closing = line(8, Metrics::new());
        closing.text = "}".to_string();
        let func = function(
            "f",
            0,
            1,
            vec![line(5, statements(1, 1)), line(6, statements(0, 1)), closing],
        );
        let p = project(vec![environment("ENV", None, vec![unit("u", None, vec![func])])]);
        let text = LcovFormatter::new(&p).generate();
        assert!(text.contains("DA:5,1\nDA:6,0\nDA:8,1\nLF:2\nLH:1\n"));
    }

    #[test]
    fn test_excluded_unit_is_not_traced() {
        let mut excluded = unit(
            "x",
            None,
            vec![function("f", 0, 1, vec![line(1, statements(9, 9))])],
        );
        excluded.unit_of_interest = false;
        let kept = unit("k", None, vec![function("g", 0, 1, vec![line(1, statements(1, 1))])]);
        let p = project(vec![environment("ENV", Some(CoverageKinds::NONE), vec![excluded, kept])]);

        let text = LcovFormatter::new(&p).with_project_dir("/work").generate();
        assert!(!text.contains("SF:src/x.c"));
        assert!(text.starts_with("TN:Demo\nSF:src/k.c\n"));
        assert_eq!(text.matches("end_of_record").count(), 1);
    }

    #[test]
    fn test_uninstrumented_unit_in_cover_environment_is_not_traced() {
        let mut plain = unit("p", None, vec![function("f", 0, 1, vec![line(1, statements(1, 1))])]);
        plain.is_instrumented = false;
        let mut env = environment("COV", Some(CoverageKinds::STATEMENT), vec![plain]);
        env.kind = EnvironmentKind::Cover;
        let p = project(vec![env]);
        assert_eq!(LcovFormatter::new(&p).generate(), "");
    }

    #[test]
    fn test_skips_empty_name_and_uncovered_units() {
        let mut nameless = unit("a", None, vec![function("f", 0, 1, vec![line(1, statements(1, 1))])]);
        nameless.display_name = String::new();
        let empty = unit("b", None, vec![function("g", 0, 1, Vec::new())]);
        let mut no_db = unit("c", None, Vec::new());
        no_db.coverage = None;
        let p = project(vec![environment("ENV", None, vec![nameless, empty, no_db])]);
        assert_eq!(LcovFormatter::new(&p).generate(), "");
    }

    #[test]
    fn test_save_under_lcov_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lcov").join("Demo.info");
        let p = project(vec![environment(
            "ENV",
            None,
            vec![unit("u", None, vec![function("f", 0, 1, vec![line(1, statements(1, 1))])])],
        )]);
        LcovFormatter::new(&p).save(&path).unwrap();
        assert!(std::fs::read_to_string(path).unwrap().ends_with("end_of_record\n"));
    }

    fn numbers(text: &str, prefix: &str) -> Vec<u32> {
        text.lines()
            .filter_map(|l| l.strip_prefix(prefix))
            .map(|rest| rest.split(',').next().unwrap().parse().unwrap())
            .collect()
    }

    proptest! {
        #[test]
        fn prop_records_sorted_by_line(
            lines in prop::collection::vec((1u32..500, 0u64..3, 0u64..3), 1..40),
            names in prop::collection::vec("[a-z]{1,6}", 1..6),
        ) {
            let functions: Vec<Function> = lines
                .chunks(8)
                .enumerate()
                .map(|(i, chunk)| {
                    let body = chunk
                        .iter()
                        .map(|(n, c, t)| line(*n, branchy((*c).min(*t), *t)))
                        .collect();
                    function(&format!("f{i}"), i as u32, 1, body)
                })
                .collect();
            let units: Vec<Unit> = names
                .iter()
                .map(|n| unit(n, None, functions.clone()))
                .collect();
            let p = project(vec![environment("ENV", None, units)]);
            let text = LcovFormatter::new(&p).with_project_dir("/work").generate();

            let files: Vec<&str> = text.lines().filter_map(|l| l.strip_prefix("SF:")).collect();
            let mut sorted = files.clone();
            sorted.sort_unstable();
            sorted.dedup();
            prop_assert_eq!(&files, &sorted);

            for record in text.split("end_of_record\n").filter(|r| !r.is_empty()) {
                let da = numbers(record, "DA:");
                prop_assert!(da.windows(2).all(|w| w[0] <= w[1]));
                let brda = numbers(record, "BRDA:");
                prop_assert!(brda.windows(2).all(|w| w[0] <= w[1]));
            }
        }
    }
}
