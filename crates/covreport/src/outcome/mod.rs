//! Test outcome classification
//!
//! Every reported test case ends in one of five outcomes. Unit tests and
//! system tests get there by different rules, both behind [`Classify`].

mod cbt;

pub use cbt::{build_dir_key, CbtLookup, CbtRecord, CbtScope};

use crate::model::{
    Environment, EnvironmentOptions, ExpectedSummary, StatusCategory, SystemTest, SystemTestType,
    TestCase, TestScope, UnitTest,
};
use std::fmt;
use tracing::debug;

/// Normalized outcome of a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Ran and passed
    Passed,
    /// Ran and failed
    Failed,
    /// Not re-run by change-based testing
    Skipped,
    /// Still needs to run
    NotRun,
    /// Could not be built or imported
    Error,
}

impl Outcome {
    /// Lower-case status name used in reports
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::NotRun => "notrun",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one test case
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Normalized outcome
    pub outcome: Outcome,
    /// Pass flag shown in reports; "needs to run" shows as passed
    pub passed: bool,
    /// Reported duration in seconds
    pub time_secs: f64,
    /// Human readable status text, lines separated by `\n`
    pub message: String,
}

/// Inputs shared by every case of one environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyContext<'a> {
    /// Environment report options
    pub options: EnvironmentOptions,
    /// Change-based testing records of this environment
    pub cbt: CbtScope<'a>,
}

/// Something that can be turned into a normalized outcome
pub trait Classify {
    /// Classify against the environment context
    fn classify(&self, ctx: &ClassifyContext<'_>) -> Classification;
}

fn expected_counts(summary: &ExpectedSummary, options: EnvironmentOptions) -> (u64, u64) {
    let mut total = summary.expected_total;
    let mut pass = total.saturating_sub(summary.expected_fail);
    if options.old_style_management_report {
        pass += summary
            .control_flow_total
            .saturating_sub(summary.control_flow_fail);
        total += summary.control_flow_total + summary.signals + summary.unexpected_exceptions;
    }
    (pass, total)
}

/// Failure causes in priority order
fn causes(summary: &ExpectedSummary) -> Vec<String> {
    let mut out = Vec::new();
    if summary.unexpected_exceptions > 0 {
        out.push(format!(
            "Unexpected exceptions: {}",
            summary.unexpected_exceptions
        ));
    }
    if summary.signals > 0 {
        out.push(format!("Signals raised: {}", summary.signals));
    }
    if summary.control_flow_fail > 0 {
        out.push(format!(
            "Control flow failures: {} / {}",
            summary.control_flow_fail, summary.control_flow_total
        ));
    }
    if summary.expected_fail > 0 {
        out.push(format!(
            "Expected value mismatches: {} / {}",
            summary.expected_fail, summary.expected_total
        ));
    }
    out
}

impl Classify for UnitTest {
    fn classify(&self, ctx: &ClassifyContext<'_>) -> Classification {
        let category = self.execution_status.category();
        let cbt = ctx.cbt.get(&self.cbt_key());

        let (outcome, passed) = if let Some(record) = cbt {
            (Outcome::Skipped, record.passed)
        } else if category == StatusCategory::NotExecuted {
            (Outcome::NotRun, true)
        } else if self.passed {
            (Outcome::Passed, true)
        } else if category == StatusCategory::BuildError {
            (Outcome::Error, false)
        } else {
            (Outcome::Failed, false)
        };

        let (pass, total) = expected_counts(&self.expected, ctx.options);
        let header = if passed { "PASS" } else { "FAIL" };
        let mut lines = vec![format!("{header} {pass} / {total}")];
        if outcome == Outcome::Skipped {
            lines.push("Skipped by change-based testing".to_string());
        }
        if !passed {
            lines.extend(causes(&self.expected));
        }
        if category != StatusCategory::Normal {
            lines.push(self.execution_status.message().to_string());
        }
        if self.strict_import_failed {
            lines.push("Strict Test Import Failure.".to_string());
        }

        Classification {
            outcome,
            passed,
            time_secs: cbt.map_or(0.0, |r| r.elapsed_secs()),
            message: lines.join("\n"),
        }
    }
}

impl Classify for SystemTest {
    fn classify(&self, _ctx: &ClassifyContext<'_>) -> Classification {
        let (outcome, status) = if self.run_needed && self.system_type == SystemTestType::Manual {
            (
                Outcome::NotRun,
                "Manual system tests can't be run in CI".to_string(),
            )
        } else if self.run_needed {
            (Outcome::NotRun, "Needs to be executed".to_string())
        } else if self.passed == self.total {
            (Outcome::Passed, "Passed".to_string())
        } else {
            (
                Outcome::Failed,
                format!("Failed {} / {}", self.passed, self.total),
            )
        };
        let passed = outcome != Outcome::Failed;
        let header = if passed { "PASS" } else { "FAIL" };

        Classification {
            outcome,
            passed,
            time_secs: 0.0,
            message: format!(
                "{header} {} / {}\n  System Test Build Status: {}.\n   System Test: {}\n   Execution Status: {status}",
                self.passed, self.total, self.build_status, self.name
            ),
        }
    }
}

impl Classify for TestCase {
    fn classify(&self, ctx: &ClassifyContext<'_>) -> Classification {
        match self {
            Self::Unit(tc) => tc.classify(ctx),
            Self::System(st) => st.classify(ctx),
        }
    }
}

/// A selected test case with its report name and outcome
#[derive(Debug, Clone)]
pub struct ClassifiedCase<'a> {
    /// The source record
    pub case: &'a TestCase,
    /// Dotted report name
    pub name: String,
    /// Source file, when known
    pub file: Option<&'a str>,
    /// Classification result
    pub classification: Classification,
}

fn keep_unit_test(tc: &UnitTest) -> bool {
    !tc.is_placeholder() && (!tc.for_compound_only || tc.strict_import_failed)
}

/// Whether a function-scoped case belongs to a unit under test and a
/// testable function
fn in_tested_function(env: &Environment, unit: &str, function: &str) -> bool {
    let Some(owner) = env.unit(unit) else {
        debug!(unit, "test case refers to an unknown unit");
        return false;
    };
    owner.is_uut && !owner.function(function).is_some_and(|f| f.non_testable_stub)
}

/// Test cases that appear in reports, in report order: compound cases,
/// init cases, function cases grouped by unit, then system tests.
/// Placeholders never appear.
#[must_use]
pub fn select_cases(env: &Environment) -> Vec<&TestCase> {
    let unit_tests = || {
        env.test_cases.iter().filter_map(|tc| match tc {
            TestCase::Unit(ut) if keep_unit_test(ut) => Some((tc, ut)),
            _ => None,
        })
    };

    let mut selected: Vec<&TestCase> = unit_tests()
        .filter(|(_, ut)| ut.scope == TestScope::Compound)
        .map(|(tc, _)| tc)
        .collect();
    selected.extend(
        unit_tests()
            .filter(|(_, ut)| ut.scope == TestScope::Init)
            .map(|(tc, _)| tc),
    );

    let mut function_cases: Vec<(usize, &TestCase)> = unit_tests()
        .filter_map(|(tc, ut)| match &ut.scope {
            TestScope::Function { unit, function } if in_tested_function(env, unit, function) => {
                let position = env.units.iter().position(|u| &u.name == unit)?;
                Some((position, tc))
            }
            _ => None,
        })
        .collect();
    function_cases.sort_by_key(|(position, _)| *position);
    selected.extend(function_cases.into_iter().map(|(_, tc)| tc));

    selected.extend(
        env.test_cases
            .iter()
            .filter(|tc| matches!(tc, TestCase::System(_))),
    );
    selected
}

/// Dotted report name of a case
#[must_use]
pub fn report_name(env: &Environment, case: &TestCase) -> String {
    match case {
        TestCase::Unit(ut) => format!(
            "{}.{}.{}",
            ut.scope.unit_name(),
            ut.scope.function_name(),
            ut.name
        ),
        TestCase::System(st) => format!("{}.{}", env.classname(), st.name),
    }
}

/// Select and classify every reported case of an environment
#[must_use]
pub fn classify_environment<'a>(env: &'a Environment, cbt: &CbtLookup) -> Vec<ClassifiedCase<'a>> {
    let ctx = ClassifyContext {
        options: env.options,
        cbt: cbt.scope(&env.build_dir),
    };
    select_cases(env)
        .into_iter()
        .map(|case| ClassifiedCase {
            case,
            name: report_name(env, case),
            file: match case {
                TestCase::Unit(ut) => ut.file.as_deref(),
                TestCase::System(_) => None,
            },
            classification: case.classify(&ctx),
        })
        .collect()
}

/// Outcome counts of a set of classified cases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    /// Number of cases
    pub tests: usize,
    /// Passed cases
    pub passed: usize,
    /// Failed cases
    pub failures: usize,
    /// Error cases
    pub errors: usize,
    /// Skipped cases
    pub skipped: usize,
    /// Cases still to run
    pub not_run: usize,
}

impl OutcomeCounts {
    /// Count outcomes
    #[must_use]
    pub fn of(cases: &[ClassifiedCase<'_>]) -> Self {
        cases.iter().fold(Self::default(), |mut counts, c| {
            counts.add(c.classification.outcome);
            counts
        })
    }

    /// Count one outcome
    pub fn add(&mut self, outcome: Outcome) {
        self.tests += 1;
        match outcome {
            Outcome::Passed => self.passed += 1,
            Outcome::Failed => self.failures += 1,
            Outcome::Error => self.errors += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::NotRun => self.not_run += 1,
        }
    }

    /// Whether nothing failed or errored
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failures == 0 && self.errors == 0
    }
}

impl std::ops::AddAssign for OutcomeCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.tests += rhs.tests;
        self.passed += rhs.passed;
        self.failures += rhs.failures;
        self.errors += rhs.errors;
        self.skipped += rhs.skipped;
        self.not_run += rhs.not_run;
    }
}
