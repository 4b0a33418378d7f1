//! Snapshot loader.
//!
//! The provider's JSON export leaves many fields out depending on its
//! version. The raw structs below mirror that shape with `Option` fields;
//! [`resolve`] turns them into the typed model once, applying a fallback
//! for every missing field so nothing downstream has to check for data.

use super::{
    CoverageKinds, CoverageRatio, Environment, EnvironmentKind, EnvironmentOptions,
    ExecutionStatus, ExpectedSummary, Function, Line, Metrics, PlaceholderKind, Project,
    SystemTest, SystemTestType, TestCase, TestScope, Unit, UnitCoverage, UnitTest,
};
use crate::result::{ReportError, ReportResult};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

const STRICT_IMPORT_FAILED: &str = "TCR_STRICT_IMPORT_FAILED";

#[derive(Debug, Deserialize)]
struct RawProject {
    name: String,
    #[serde(default)]
    simplified_mcdc: bool,
    #[serde(default)]
    environments: Vec<RawEnvironment>,
}

#[derive(Debug, Deserialize)]
struct RawEnvironment {
    name: String,
    #[serde(default)]
    compiler: String,
    #[serde(default)]
    testsuite: String,
    #[serde(default)]
    build_dir: String,
    #[serde(default)]
    kind: RawEnvironmentKind,
    coverage_type: Option<String>,
    #[serde(default)]
    old_style_management_report: bool,
    #[serde(default)]
    units: Vec<RawUnit>,
    #[serde(default)]
    test_cases: Vec<RawTestCase>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawEnvironmentKind {
    #[default]
    #[serde(alias = "unit_test", alias = "unittest")]
    Unit,
    Cover,
}

#[derive(Debug, Deserialize)]
struct RawUnit {
    name: String,
    display_name: Option<String>,
    display_path: Option<String>,
    #[serde(default = "default_true")]
    unit_of_interest: bool,
    #[serde(default)]
    is_uut: bool,
    #[serde(default = "default_true")]
    is_instrumented: bool,
    coverage: Option<RawUnitCoverage>,
}

#[derive(Debug, Deserialize)]
struct RawUnitCoverage {
    coverage_type: Option<String>,
    metrics: Option<Metrics>,
    functions_covered: Option<RawRatio>,
    basis_paths: Option<RawRatio>,
    #[serde(default)]
    functions: Vec<RawFunction>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct RawRatio {
    covered: u64,
    total: u64,
}

impl From<RawRatio> for CoverageRatio {
    fn from(raw: RawRatio) -> Self {
        Self::new(raw.covered, raw.total)
    }
}

#[derive(Debug, Deserialize)]
struct RawFunction {
    name: String,
    display_name: Option<String>,
    parameterized_name: Option<String>,
    index: Option<u32>,
    start_line: Option<u32>,
    complexity: Option<i32>,
    #[serde(default)]
    non_testable_stub: bool,
    has_covered_objects: Option<bool>,
    metrics: Option<Metrics>,
    basis_paths: Option<RawRatio>,
    #[serde(default)]
    lines: Vec<RawLine>,
}

#[derive(Debug, Deserialize)]
struct RawLine {
    number: u32,
    #[serde(default)]
    text: String,
    #[serde(default)]
    metrics: Metrics,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawTestCase {
    Unit(RawUnitTest),
    System(RawSystemTest),
}

#[derive(Debug, Deserialize)]
struct RawUnitTest {
    name: String,
    unit: Option<String>,
    function: Option<String>,
    kind: Option<String>,
    file: Option<String>,
    #[serde(default)]
    for_compound_only: bool,
    placeholder: Option<String>,
    execution_status: Option<String>,
    testcase_status: Option<String>,
    #[serde(default)]
    passed: bool,
    #[serde(default)]
    expected: ExpectedSummary,
}

#[derive(Debug, Deserialize)]
struct RawSystemTest {
    name: String,
    build_status: Option<String>,
    system_type: Option<String>,
    #[serde(default)]
    run_needed: bool,
    #[serde(default)]
    passed: u64,
    #[serde(default)]
    total: u64,
}

const fn default_true() -> bool {
    true
}

/// Load a project snapshot from a JSON file
///
/// # Errors
///
/// Returns error if the file cannot be read or is not a valid snapshot
pub fn load_project(path: &Path) -> ReportResult<Project> {
    debug!(path = %path.display(), "loading project snapshot");
    let text = std::fs::read_to_string(path)?;
    parse_project(&text)
}

/// Parse a project snapshot from JSON text
///
/// # Errors
///
/// Returns error if the text is not a valid snapshot
pub fn parse_project(json: &str) -> ReportResult<Project> {
    if json.trim().is_empty() {
        return Err(ReportError::invalid_input("empty project snapshot"));
    }
    let raw: RawProject = serde_json::from_str(json)?;
    Ok(resolve(raw))
}

fn resolve(raw: RawProject) -> Project {
    Project {
        name: raw.name,
        simplified_mcdc: raw.simplified_mcdc,
        environments: raw
            .environments
            .into_iter()
            .map(resolve_environment)
            .collect(),
    }
}

fn resolve_kinds(scope: &str, text: Option<&str>) -> Option<CoverageKinds> {
    let text = text?;
    let kinds = CoverageKinds::parse(text);
    if kinds.is_none() {
        warn!(scope, coverage_type = text, "unrecognized coverage type, treating as no data");
    }
    kinds
}

fn resolve_environment(raw: RawEnvironment) -> Environment {
    let coverage = resolve_kinds(&raw.name, raw.coverage_type.as_deref());
    if coverage.is_none() {
        debug!(environment = %raw.name, "no coverage information");
    }
    let test_cases = raw
        .test_cases
        .into_iter()
        .filter_map(|tc| resolve_test_case(&raw.name, tc))
        .collect();

    Environment {
        kind: match raw.kind {
            RawEnvironmentKind::Unit => EnvironmentKind::UnitTest,
            RawEnvironmentKind::Cover => EnvironmentKind::Cover,
        },
        coverage,
        options: EnvironmentOptions {
            old_style_management_report: raw.old_style_management_report,
        },
        units: raw.units.into_iter().map(resolve_unit).collect(),
        test_cases,
        name: raw.name,
        compiler: raw.compiler,
        testsuite: raw.testsuite,
        build_dir: raw.build_dir,
    }
}

fn resolve_unit(raw: RawUnit) -> Unit {
    let display_name = raw.display_name.unwrap_or_else(|| raw.name.clone());
    let display_path = raw.display_path.unwrap_or_else(|| display_name.clone());
    let coverage = raw.coverage.map(|c| resolve_unit_coverage(&raw.name, c));
    Unit {
        name: raw.name,
        display_name,
        display_path,
        unit_of_interest: raw.unit_of_interest,
        is_uut: raw.is_uut,
        is_instrumented: raw.is_instrumented,
        coverage,
    }
}

fn resolve_unit_coverage(unit: &str, raw: RawUnitCoverage) -> UnitCoverage {
    let kinds = resolve_kinds(unit, raw.coverage_type.as_deref());
    let functions: Vec<Function> = raw
        .functions
        .into_iter()
        .enumerate()
        .map(|(position, f)| resolve_function(position, f))
        .collect();

    let metrics = raw
        .metrics
        .unwrap_or_else(|| functions.iter().map(|f| &f.metrics).sum());
    let functions_covered = raw.functions_covered.map_or_else(
        || {
            let covered = functions
                .iter()
                .filter(|f| f.metrics.has_anything_covered())
                .count();
            CoverageRatio::new(covered as u64, functions.len() as u64)
        },
        CoverageRatio::from,
    );
    let basis_paths = raw.basis_paths.map_or_else(
        || {
            functions
                .iter()
                .fold(CoverageRatio::default(), |acc, f| acc + f.basis_paths)
        },
        CoverageRatio::from,
    );

    UnitCoverage {
        kinds,
        metrics,
        functions_covered,
        basis_paths,
        functions,
    }
}

fn resolve_function(position: usize, raw: RawFunction) -> Function {
    let lines: Vec<Line> = raw
        .lines
        .into_iter()
        .map(|l| Line {
            number: l.number,
            text: l.text,
            metrics: l.metrics,
        })
        .collect();
    let metrics = raw
        .metrics
        .unwrap_or_else(|| lines.iter().map(|l| &l.metrics).sum());
    let has_covered_objects = raw
        .has_covered_objects
        .unwrap_or_else(|| metrics.has_anything_covered());
    let start_line = raw
        .start_line
        .or_else(|| lines.first().map(|l| l.number))
        .unwrap_or(0);
    let index = raw
        .index
        .unwrap_or_else(|| u32::try_from(position).unwrap_or(u32::MAX));

    Function {
        display_name: raw.display_name.unwrap_or_else(|| raw.name.clone()),
        parameterized_name: raw
            .parameterized_name
            .unwrap_or_else(|| raw.name.clone()),
        name: raw.name,
        index,
        start_line,
        complexity: raw.complexity.unwrap_or(-1),
        non_testable_stub: raw.non_testable_stub,
        has_covered_objects,
        metrics,
        basis_paths: raw.basis_paths.map(CoverageRatio::from).unwrap_or_default(),
        lines,
    }
}

fn resolve_placeholder(text: &str) -> Option<PlaceholderKind> {
    match text.to_ascii_lowercase().as_str() {
        "csv_map" | "csv" => Some(PlaceholderKind::CsvMap),
        "vct_map" | "vct" => Some(PlaceholderKind::VctMap),
        "coded_tests_map" | "coded_test_map" => Some(PlaceholderKind::CodedTestsMap),
        "variant_logic_false" => Some(PlaceholderKind::VariantLogicFalse),
        _ => None,
    }
}

fn resolve_test_case(env: &str, raw: RawTestCase) -> Option<TestCase> {
    match raw {
        RawTestCase::Unit(tc) => resolve_unit_test(env, tc).map(TestCase::Unit),
        RawTestCase::System(st) => Some(TestCase::System(SystemTest {
            name: st.name,
            build_status: st.build_status.unwrap_or_default(),
            system_type: match st.system_type.as_deref().map(str::to_ascii_uppercase) {
                Some(t) if t == "MANUAL" || t == "2" => SystemTestType::Manual,
                _ => SystemTestType::Automatic,
            },
            run_needed: st.run_needed,
            passed: st.passed,
            total: st.total,
        })),
    }
}

fn resolve_unit_test(env: &str, raw: RawUnitTest) -> Option<UnitTest> {
    let scope = match raw.kind.as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("compound") => TestScope::Compound,
        Some("init") => TestScope::Init,
        _ => match (raw.unit, raw.function) {
            (Some(unit), Some(function)) => TestScope::Function { unit, function },
            _ => {
                warn!(
                    environment = env,
                    test_case = %raw.name,
                    "test case has no owning unit or function, skipping"
                );
                return None;
            }
        },
    };

    let placeholder = raw.placeholder.as_deref().and_then(|p| {
        let kind = resolve_placeholder(p);
        if kind.is_none() {
            warn!(test_case = %raw.name, placeholder = p, "unknown placeholder kind ignored");
        }
        kind
    });
    let execution_status = raw
        .execution_status
        .as_deref()
        .map_or(ExecutionStatus::NotExecuted, ExecutionStatus::parse);
    if let ExecutionStatus::Unknown(code) = &execution_status {
        warn!(test_case = %raw.name, code = %code, "unrecognized execution status");
    }

    Some(UnitTest {
        name: raw.name,
        scope,
        file: raw.file,
        for_compound_only: raw.for_compound_only,
        placeholder,
        execution_status,
        strict_import_failed: raw.testcase_status.as_deref() == Some(STRICT_IMPORT_FAILED),
        passed: raw.passed,
        expected: raw.expected,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::model::Counter;

    const SNAPSHOT: &str = r#"{
        "name": "Tutorial",
        "environments": [{
            "name": "ENV1",
            "compiler": "GNU",
            "testsuite": "Suite",
            "build_dir": "/build/gnu/suite",
            "coverage_type": "STATEMENT_BRANCH",
            "units": [{
                "name": "manager",
                "display_name": "manager.c",
                "is_uut": true,
                "coverage": {
                    "functions": [{
                        "name": "Add_Party",
                        "complexity": 3,
                        "lines": [
                            {"number": 10, "metrics": {"statements": {"total": 1, "covered": 1, "max_covered": 1}}},
                            {"number": 11, "metrics": {"statements": {"total": 1}}}
                        ]
                    }, {
                        "name": "Clear_Table",
                        "lines": [
                            {"number": 20, "metrics": {"statements": {"total": 2}}}
                        ]
                    }]
                }
            }],
            "test_cases": [
                {"type": "unit", "name": "TC1", "unit": "manager", "function": "Add_Party",
                 "execution_status": "EXEC_SUCCESS_PASS", "passed": true},
                {"type": "unit", "name": "COMP", "kind": "compound",
                 "testcase_status": "TCR_STRICT_IMPORT_FAILED"},
                {"type": "unit", "name": "orphan"},
                {"type": "system", "name": "ST1", "system_type": "MANUAL", "run_needed": true}
            ]
        }]
    }"#;

    #[test]
    fn test_parse_snapshot() {
        let project = parse_project(SNAPSHOT).unwrap();
        assert_eq!(project.name, "Tutorial");
        assert!(!project.simplified_mcdc);
        let env = &project.environments[0];
        assert_eq!(env.kind, EnvironmentKind::UnitTest);
        assert_eq!(
            env.coverage,
            Some(CoverageKinds::STATEMENT | CoverageKinds::BRANCH)
        );
    }

    #[test]
    fn test_metrics_roll_up_from_lines_then_functions() {
        let project = parse_project(SNAPSHOT).unwrap();
        let cov = project.environments[0].units[0].coverage.as_ref().unwrap();
        assert_eq!(cov.functions[0].metrics.statements, Counter::new(2, 1, 1));
        assert_eq!(cov.metrics.statements, Counter::new(4, 1, 1));
        assert_eq!(cov.functions_covered, CoverageRatio::new(1, 2));
    }

    #[test]
    fn test_function_fallbacks() {
        let project = parse_project(SNAPSHOT).unwrap();
        let cov = project.environments[0].units[0].coverage.as_ref().unwrap();
        let clear = &cov.functions[1];
        assert_eq!(clear.index, 1);
        assert_eq!(clear.start_line, 20);
        assert_eq!(clear.complexity, -1);
        assert!(!clear.has_covered_objects);
        assert_eq!(clear.display_name, "Clear_Table");
    }

    #[test]
    fn test_test_case_resolution() {
        let project = parse_project(SNAPSHOT).unwrap();
        let cases = &project.environments[0].test_cases;
        // the orphan unit test is dropped
        assert_eq!(cases.len(), 3);
        let TestCase::Unit(compound) = &cases[1] else {
            panic!("expected unit test");
        };
        assert_eq!(compound.scope, TestScope::Compound);
        assert!(compound.strict_import_failed);
        assert_eq!(compound.execution_status, ExecutionStatus::NotExecuted);
        let TestCase::System(st) = &cases[2] else {
            panic!("expected system test");
        };
        assert_eq!(st.system_type, SystemTestType::Manual);
    }

    #[test]
    fn test_unrecognized_coverage_type_is_no_data() {
        let json = r#"{"name": "P", "environments": [{"name": "E", "coverage_type": "glitter"}]}"#;
        let project = parse_project(json).unwrap();
        assert_eq!(project.environments[0].coverage, None);
    }

    #[test]
    fn test_empty_snapshot_is_invalid() {
        let err = parse_project("  ").unwrap_err();
        assert!(matches!(err, ReportError::InvalidInput { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_project(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ReportError::Io(_)));
    }
}
