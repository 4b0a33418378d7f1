//! Builders for in-memory projects used by unit tests.

use crate::model::{
    Counter, CoverageKinds, CoverageRatio, Environment, EnvironmentKind, EnvironmentOptions,
    Function, Line, Metrics, Project, TestCase, Unit, UnitCoverage,
};

pub fn statements(covered: u64, total: u64) -> Metrics {
    Metrics::new().with_statements(Counter::of(covered, total))
}

pub fn line(number: u32, metrics: Metrics) -> Line {
    Line {
        number,
        text: format!("stmt_{number};"),
        metrics,
    }
}

pub fn function(name: &str, index: u32, complexity: i32, lines: Vec<Line>) -> Function {
    let metrics: Metrics = lines.iter().map(|l| &l.metrics).sum();
    Function {
        name: name.to_string(),
        display_name: name.to_string(),
        parameterized_name: format!("{name}(void)"),
        index,
        start_line: lines.first().map_or(1, |l| l.number),
        complexity,
        non_testable_stub: false,
        has_covered_objects: metrics.has_anything_covered(),
        metrics,
        basis_paths: CoverageRatio::default(),
        lines,
    }
}

pub fn unit(name: &str, kinds: Option<CoverageKinds>, functions: Vec<Function>) -> Unit {
    let metrics: Metrics = functions.iter().map(|f| &f.metrics).sum();
    let covered = functions.iter().filter(|f| f.has_covered_objects).count() as u64;
    Unit {
        name: name.to_string(),
        display_name: format!("{name}.c"),
        display_path: format!("/work/src/{name}.c"),
        unit_of_interest: true,
        is_uut: true,
        is_instrumented: true,
        coverage: Some(UnitCoverage {
            kinds,
            metrics,
            functions_covered: CoverageRatio::new(covered, functions.len() as u64),
            basis_paths: CoverageRatio::default(),
            functions,
        }),
    }
}

pub fn environment(name: &str, kinds: Option<CoverageKinds>, units: Vec<Unit>) -> Environment {
    Environment {
        name: name.to_string(),
        compiler: "GNU_Native".to_string(),
        testsuite: "TestSuite".to_string(),
        build_dir: format!("/work/build/{name}"),
        kind: EnvironmentKind::UnitTest,
        coverage: kinds,
        options: EnvironmentOptions::default(),
        units,
        test_cases: Vec::new(),
    }
}

pub fn with_tests(mut env: Environment, test_cases: Vec<TestCase>) -> Environment {
    env.test_cases = test_cases;
    env
}

pub fn project(environments: Vec<Environment>) -> Project {
    Project {
        name: "Demo".to_string(),
        simplified_mcdc: false,
        environments,
    }
}
