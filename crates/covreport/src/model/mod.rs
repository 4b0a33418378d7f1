//! Typed view over the provider's coverage and test-execution data.
//!
//! Everything here is built once by [`load`] and only read afterwards.
//! The hierarchy is project → environment → unit → function → line, with
//! test cases hanging off the environment.

mod kinds;
pub mod load;
mod metrics;
mod status;
mod test_case;

pub use kinds::CoverageKinds;
pub use metrics::{Counter, Metrics};
pub use status::{ExecutionStatus, StatusCategory};
pub use test_case::{
    ExpectedSummary, PlaceholderKind, SystemTest, SystemTestType, TestCase, TestScope, UnitTest,
    COMPOUND_GROUP, INIT_GROUP,
};

/// A `(covered, total)` pair supplied directly by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageRatio {
    /// Covered items
    pub covered: u64,
    /// Total items
    pub total: u64,
}

impl CoverageRatio {
    /// Create a ratio
    #[must_use]
    pub const fn new(covered: u64, total: u64) -> Self {
        Self { covered, total }
    }
}

impl std::ops::Add for CoverageRatio {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.covered + rhs.covered, self.total + rhs.total)
    }
}

/// One source line with its coverage counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based line number
    pub number: u32,
    /// Source text of the line
    pub text: String,
    /// Counters attached to this line
    pub metrics: Metrics,
}

impl Line {
    /// Whether any coverage kind is instrumented on this line
    #[must_use]
    pub fn is_coverage_bearing(&self) -> bool {
        self.metrics.has_any_coverage()
    }
}

/// One function (subprogram) of a unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Plain name
    pub name: String,
    /// Name shown in unit-test reports
    pub display_name: String,
    /// Name including the parameter list
    pub parameterized_name: String,
    /// Provider ordering index
    pub index: u32,
    /// First line of the function
    pub start_line: u32,
    /// Cyclomatic complexity; negative when unknown
    pub complexity: i32,
    /// Stub that cannot carry test cases
    pub non_testable_stub: bool,
    /// Provider flag for function coverage
    pub has_covered_objects: bool,
    /// Function-level counters
    pub metrics: Metrics,
    /// Basis-path ratio
    pub basis_paths: CoverageRatio,
    /// Lines in source order
    pub lines: Vec<Line>,
}

impl Function {
    /// Whether at least one line carries coverage
    #[must_use]
    pub fn has_coverage_data(&self) -> bool {
        self.lines.iter().any(Line::is_coverage_bearing)
    }

    /// Last line that carries coverage, in iteration order
    #[must_use]
    pub fn last_coverage_line(&self) -> Option<&Line> {
        self.lines.iter().rev().find(|l| l.is_coverage_bearing())
    }

    /// Function name followed by its parameter list, as LCOV wants it
    #[must_use]
    pub fn lcov_name(&self) -> String {
        let params = self.parameterized_name.replacen(&self.name, "", 1);
        format!("{}{params}", self.name)
    }
}

/// Coverage database attached to a unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitCoverage {
    /// Kinds enabled for this unit; `None` inherits the environment's
    pub kinds: Option<CoverageKinds>,
    /// Unit-level counters
    pub metrics: Metrics,
    /// Functions covered vs function count
    pub functions_covered: CoverageRatio,
    /// Basis-path ratio
    pub basis_paths: CoverageRatio,
    /// Functions in provider order
    pub functions: Vec<Function>,
}

/// A source file or translation unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// Unit name
    pub name: String,
    /// File name shown in reports
    pub display_name: String,
    /// Full path of the file
    pub display_path: String,
    /// Flagged as of interest by the provider
    pub unit_of_interest: bool,
    /// Unit under test
    pub is_uut: bool,
    /// Instrumented for coverage (cover environments)
    pub is_instrumented: bool,
    /// Attached coverage database, if any
    pub coverage: Option<UnitCoverage>,
}

impl Unit {
    /// Effective coverage kinds given the environment default
    #[must_use]
    pub fn kinds(&self, env_default: Option<CoverageKinds>) -> CoverageKinds {
        self.coverage
            .as_ref()
            .and_then(|c| c.kinds)
            .or(env_default)
            .unwrap_or(CoverageKinds::NONE)
    }

    /// Look up a function by display name
    #[must_use]
    pub fn function(&self, display_name: &str) -> Option<&Function> {
        self.coverage
            .as_ref()?
            .functions
            .iter()
            .find(|f| f.display_name == display_name || f.name == display_name)
    }
}

/// Environment flavour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnvironmentKind {
    /// Unit-test environment
    #[default]
    UnitTest,
    /// Coverage-only environment
    Cover,
}

/// Per-environment options that change report contents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvironmentOptions {
    /// Count control-flow, signals and exceptions into expected totals
    pub old_style_management_report: bool,
}

/// One build/test environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Environment name
    pub name: String,
    /// Compiler configuration name
    pub compiler: String,
    /// Test suite name
    pub testsuite: String,
    /// Build directory
    pub build_dir: String,
    /// Unit-test or cover environment
    pub kind: EnvironmentKind,
    /// Enabled coverage kinds; `None` when coverage info is unavailable
    pub coverage: Option<CoverageKinds>,
    /// Report options
    pub options: EnvironmentOptions,
    /// Units in provider order
    pub units: Vec<Unit>,
    /// Test cases in provider order
    pub test_cases: Vec<TestCase>,
}

impl Environment {
    /// Whether this is a coverage-only environment
    #[must_use]
    pub fn is_cover(&self) -> bool {
        self.kind == EnvironmentKind::Cover
    }

    /// Look up a unit by name
    #[must_use]
    pub fn unit(&self, name: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.name == name)
    }

    /// Dotted JUnit class name, dots removed from each part
    #[must_use]
    pub fn classname(&self) -> String {
        [&self.compiler, &self.testsuite, &self.name]
            .iter()
            .map(|part| part.replace('.', ""))
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Top-level scope of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    /// Project name
    pub name: String,
    /// Simplified MC/DC reporting is on
    pub simplified_mcdc: bool,
    /// Environments in provider order
    pub environments: Vec<Environment>,
}

impl Project {
    /// Look up an environment by name
    #[must_use]
    pub fn environment(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|e| e.name == name)
    }
}
