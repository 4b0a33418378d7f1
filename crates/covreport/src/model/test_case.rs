//! Test case records as reported by the provider.

use super::status::ExecutionStatus;
use serde::Deserialize;

/// Grouping name used for compound test cases
pub const COMPOUND_GROUP: &str = "<<COMPOUND>>";
/// Grouping name used for initialization test cases
pub const INIT_GROUP: &str = "<<INIT>>";

/// Synthetic records that are not real tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// CSV import map
    CsvMap,
    /// VCT import map
    VctMap,
    /// Coded test map
    CodedTestsMap,
    /// Variant logic evaluated to false
    VariantLogicFalse,
}

/// Where a unit test case lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestScope {
    /// Test case of a specific function
    Function {
        /// Owning unit name
        unit: String,
        /// Function display name
        function: String,
    },
    /// Compound test case
    Compound,
    /// Initialization test case
    Init,
}

impl TestScope {
    /// Unit part of the dotted test name
    #[must_use]
    pub fn unit_name(&self) -> &str {
        match self {
            Self::Function { unit, .. } => unit,
            Self::Compound => COMPOUND_GROUP,
            Self::Init => INIT_GROUP,
        }
    }

    /// Function part of the dotted test name
    #[must_use]
    pub fn function_name(&self) -> &str {
        match self {
            Self::Function { function, .. } => function,
            Self::Compound => COMPOUND_GROUP,
            Self::Init => INIT_GROUP,
        }
    }
}

/// Expected-value and failure sub-signal counts of one execution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExpectedSummary {
    /// Number of expected values checked
    pub expected_total: u64,
    /// Number of expected values that mismatched
    pub expected_fail: u64,
    /// Number of control-flow checks
    pub control_flow_total: u64,
    /// Number of control-flow failures
    pub control_flow_fail: u64,
    /// Number of signals raised
    pub signals: u64,
    /// Number of unexpected exceptions raised
    pub unexpected_exceptions: u64,
}

/// A unit-scoped (or compound/init) test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitTest {
    /// Test case name
    pub name: String,
    /// Owning scope
    pub scope: TestScope,
    /// Source file of the owning unit, when known
    pub file: Option<String>,
    /// Only used as a slot of a compound test
    pub for_compound_only: bool,
    /// Set for synthetic map records
    pub placeholder: Option<PlaceholderKind>,
    /// Raw execution status
    pub execution_status: ExecutionStatus,
    /// Strict import of this test case failed
    pub strict_import_failed: bool,
    /// Provider's pass flag
    pub passed: bool,
    /// Expected-value summary of the last execution
    pub expected: ExpectedSummary,
}

impl UnitTest {
    /// Create a passing function test case
    #[must_use]
    pub fn new(name: impl Into<String>, scope: TestScope) -> Self {
        Self {
            name: name.into(),
            scope,
            file: None,
            for_compound_only: false,
            placeholder: None,
            execution_status: ExecutionStatus::SuccessPass,
            strict_import_failed: false,
            passed: true,
            expected: ExpectedSummary::default(),
        }
    }

    /// Set the execution status and pass flag
    #[must_use]
    pub fn with_status(mut self, status: ExecutionStatus, passed: bool) -> Self {
        self.execution_status = status;
        self.passed = passed;
        self
    }

    /// Set expected-value counts
    #[must_use]
    pub const fn with_expected(mut self, expected: ExpectedSummary) -> Self {
        self.expected = expected;
        self
    }

    /// Mark as a placeholder record
    #[must_use]
    pub const fn with_placeholder(mut self, kind: PlaceholderKind) -> Self {
        self.placeholder = Some(kind);
        self
    }

    /// Mark as compound-only
    #[must_use]
    pub const fn compound_only(mut self) -> Self {
        self.for_compound_only = true;
        self
    }

    /// Mark strict import as failed
    #[must_use]
    pub const fn with_strict_import_failure(mut self) -> Self {
        self.strict_import_failed = true;
        self
    }

    /// Set the source file
    #[must_use]
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Whether this record is a synthetic map that never appears in reports
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }

    /// Identifier used for change-based-testing lookups
    #[must_use]
    pub fn cbt_key(&self) -> String {
        format!(
            "{}/{}/{}",
            self.scope.unit_name(),
            self.scope.function_name(),
            self.name
        )
    }
}

/// Kind of a system test
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SystemTestType {
    /// Executed by the tool
    #[default]
    Automatic,
    /// Executed by a person
    Manual,
}

/// A system-level test with no unit or function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemTest {
    /// Test name
    pub name: String,
    /// Build status text
    pub build_status: String,
    /// Automatic or manual
    pub system_type: SystemTestType,
    /// Test still has to be executed
    pub run_needed: bool,
    /// Passed checks
    pub passed: u64,
    /// Total checks
    pub total: u64,
}

impl SystemTest {
    /// Create a system test that passed all checks
    #[must_use]
    pub fn new(name: impl Into<String>, passed: u64, total: u64) -> Self {
        Self {
            name: name.into(),
            build_status: "Success".to_string(),
            system_type: SystemTestType::Automatic,
            run_needed: false,
            passed,
            total,
        }
    }

    /// Mark as needing a run
    #[must_use]
    pub const fn needs_run(mut self, system_type: SystemTestType) -> Self {
        self.run_needed = true;
        self.system_type = system_type;
        self
    }
}

/// A test case of either flavour
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestCase {
    /// Unit, compound or init test
    Unit(UnitTest),
    /// System test
    System(SystemTest),
}

impl TestCase {
    /// Test name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Unit(tc) => &tc.name,
            Self::System(st) => &st.name,
        }
    }
}
