//! Raw execution status codes reported for unit test cases.

use std::fmt;
use std::str::FromStr;
use strum::{AsRefStr, EnumString};

/// How an execution status should be treated when a test did not pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    /// Test ran to completion
    Normal,
    /// Test ran but did not complete or could not be judged
    ExecutionFailure,
    /// Test could not be built, imported or structured
    BuildError,
    /// No result recorded yet
    NotExecuted,
}

/// Execution status code of a unit test case.
///
/// Variants mirror the provider's `EXEC_*` codes one to one.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, EnumString, AsRefStr)]
pub enum ExecutionStatus {
    #[strum(serialize = "EXEC_SUCCESS_PASS")]
    SuccessPass,
    #[strum(serialize = "EXEC_SUCCESS_FAIL")]
    SuccessFail,
    #[strum(serialize = "EXEC_SUCCESS_NONE")]
    SuccessNone,
    #[strum(serialize = "EXEC_EXECUTION_FAILED")]
    ExecutionFailed,
    #[strum(serialize = "EXEC_ABORTED")]
    Aborted,
    #[strum(serialize = "EXEC_TIMEOUT_EXCEEDED")]
    TimeoutExceeded,
    #[strum(serialize = "EXEC_VXWORKS_LOAD_ERROR")]
    VxWorksLoadError,
    #[strum(serialize = "EXEC_USER_CODE_COMPILE_FAILED")]
    UserCodeCompileFailed,
    #[strum(serialize = "EXEC_COMPOUND_ONLY")]
    CompoundOnly,
    #[strum(serialize = "EXEC_STRICT_IMPORT_FAILED")]
    StrictImportFailed,
    #[strum(serialize = "EXEC_MACRO_NOT_FOUND")]
    MacroNotFound,
    #[strum(serialize = "EXEC_SYMBOL_OR_MACRO_NOT_FOUND")]
    SymbolOrMacroNotFound,
    #[strum(serialize = "EXEC_SYMBOL_OR_MACRO_TYPE_MISMATCH")]
    SymbolOrMacroTypeMismatch,
    #[strum(serialize = "EXEC_MAX_VARY_EXCEEDED")]
    MaxVaryExceeded,
    #[strum(serialize = "EXEC_COMPOUND_WITH_NO_SLOTS")]
    CompoundWithNoSlots,
    #[strum(serialize = "EXEC_COMPOUND_WITH_ZERO_ITERATIONS")]
    CompoundWithZeroIterations,
    #[strum(serialize = "EXEC_STRING_LENGTH_EXCEEDED")]
    StringLengthExceeded,
    #[strum(serialize = "EXEC_FILE_COUNT_EXCEEDED")]
    FileCountExceeded,
    #[strum(serialize = "EXEC_EMPTY_TESTCASE")]
    EmptyTestcase,
    #[strum(serialize = "EXEC_NO_EXPECTED_RETURN")]
    NoExpectedReturn,
    #[strum(serialize = "EXEC_NO_EXPECTED_VALUES")]
    NoExpectedValues,
    #[strum(serialize = "EXEC_CSV_MAP")]
    CsvMap,
    #[strum(serialize = "EXEC_DRIVER_DATA_COMPILE_FAILED")]
    DriverDataCompileFailed,
    #[strum(serialize = "EXEC_RECURSIVE_COMPOUND")]
    RecursiveCompound,
    #[strum(serialize = "EXEC_SPECIALIZED_COMPOUND_CONTAINING_COMMON")]
    SpecializedCompoundContainingCommon,
    #[strum(serialize = "EXEC_COMMON_COMPOUND_CONTAINING_SPECIALIZED")]
    CommonCompoundContainingSpecialized,
    #[strum(serialize = "EXEC_HIDING_EXPECTED_RESULTS")]
    HidingExpectedResults,
    #[strum(serialize = "INVALID_TEST_CASE")]
    InvalidTestCase,
    /// No execution result exists ("needs to run")
    #[strum(to_string = "EXEC_NOT_RUN", serialize = "NONE", serialize = "")]
    NotExecuted,
    /// A code this version does not know
    #[strum(default)]
    Unknown(String),
}

impl ExecutionStatus {
    /// Parse the provider's status code. Unknown codes are kept verbatim.
    #[must_use]
    pub fn parse(code: &str) -> Self {
        let code = code.trim();
        Self::from_str(code).unwrap_or_else(|_| Self::Unknown(code.to_string()))
    }

    /// Provider spelling of the code
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Unknown(code) => code,
            known => known.as_ref(),
        }
    }

    /// Human readable description used in failure messages
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::SuccessPass => "Testcase passed",
            Self::SuccessFail => "Testcase failed on expected values",
            Self::SuccessNone => "No expected results",
            Self::ExecutionFailed => {
                "Testcase failed to run to completion (possible testcase timeout)"
            }
            Self::Aborted => "User aborted testcase",
            Self::TimeoutExceeded => "Testcase timeout",
            Self::VxWorksLoadError => "VxWorks load error",
            Self::UserCodeCompileFailed => "User code failed to compile",
            Self::CompoundOnly => "Compound only test case",
            Self::StrictImportFailed => "Strict Testcase Import Failure",
            Self::MacroNotFound => "Macro not found",
            Self::SymbolOrMacroNotFound => "Symbol or macro not found",
            Self::SymbolOrMacroTypeMismatch => "Symbol or macro type mismatch",
            Self::MaxVaryExceeded => "Maximum varied parameters exceeded",
            Self::CompoundWithNoSlots => "Compound with no slot",
            Self::CompoundWithZeroIterations => "Compound with zero slot",
            Self::StringLengthExceeded => "Maximum string length exceeded",
            Self::FileCountExceeded => "Maximum file count exceeded",
            Self::EmptyTestcase => "Empty testcase",
            Self::NoExpectedReturn => "No expected return value",
            Self::NoExpectedValues => "No expected values",
            Self::CsvMap => "CSV Map",
            Self::DriverDataCompileFailed => "Driver data failed to compile",
            Self::RecursiveCompound => "Recursive Compound Test",
            Self::SpecializedCompoundContainingCommon => {
                "Specialized compound containing non-specialized testcases"
            }
            Self::CommonCompoundContainingSpecialized => {
                "Non-specialized compound containing specialized testcases"
            }
            Self::HidingExpectedResults => "Hiding expected results",
            Self::InvalidTestCase => "Invalid Test Case",
            Self::NotExecuted => "Needs to be executed",
            Self::Unknown(_) => "Unrecognized execution status",
        }
    }

    /// Category used by the outcome classifier
    #[must_use]
    pub const fn category(&self) -> StatusCategory {
        match self {
            Self::SuccessPass | Self::SuccessFail | Self::SuccessNone => StatusCategory::Normal,
            Self::ExecutionFailed
            | Self::Aborted
            | Self::TimeoutExceeded
            | Self::NoExpectedReturn
            | Self::NoExpectedValues
            | Self::HidingExpectedResults
            | Self::CompoundOnly
            | Self::Unknown(_) => StatusCategory::ExecutionFailure,
            Self::VxWorksLoadError
            | Self::UserCodeCompileFailed
            | Self::StrictImportFailed
            | Self::MacroNotFound
            | Self::SymbolOrMacroNotFound
            | Self::SymbolOrMacroTypeMismatch
            | Self::MaxVaryExceeded
            | Self::CompoundWithNoSlots
            | Self::CompoundWithZeroIterations
            | Self::StringLengthExceeded
            | Self::FileCountExceeded
            | Self::EmptyTestcase
            | Self::CsvMap
            | Self::DriverDataCompileFailed
            | Self::RecursiveCompound
            | Self::SpecializedCompoundContainingCommon
            | Self::CommonCompoundContainingSpecialized
            | Self::InvalidTestCase => StatusCategory::BuildError,
            Self::NotExecuted => StatusCategory::NotExecuted,
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
