//! covreport: coverage and test-result aggregation for CI dashboards
//!
//! Reads a JSON snapshot of a test tool's coverage and execution data,
//! rolls coverage up from lines to the whole project, classifies every test
//! case and writes the reports CI servers understand.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      COVREPORT Pipeline                          │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌────────────┐   ┌────────────┐   ┌───────────┐  │
//! │  │ model    │──►│ coverage   │──►│ emit       │──►│ xml_data/ │  │
//! │  │ (load)   │   │ (rollup)   │   │ coverage   │   │ lcov/     │  │
//! │  │          │──►│ outcome    │──►│ junit      │   │ *.md      │  │
//! │  └──────────┘   │ (classify) │   │ lcov / md  │   └───────────┘  │
//! │                 └────────────┘   └────────────┘                  │
//! │  qa_report: status text ──────────► test_results_*.xml           │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use covreport::{aggregate_environment, load_project, CoverageXmlFormatter};
//! use std::path::Path;
//!
//! let project = load_project(Path::new("snapshot.json"))?;
//! for env in &project.environments {
//!     if let Some(report) = aggregate_environment(&project, env) {
//!         let xml = CoverageXmlFormatter::environment(&report).generate();
//!         println!("{xml}");
//!     }
//! }
//! # Ok::<(), covreport::ReportError>(())
//! ```

#![warn(missing_docs)]

/// Report settings and `covreport.yaml`
pub mod config;

/// Coverage rollup from functions to the whole project
#[allow(clippy::cast_precision_loss)]
pub mod coverage;

/// Report writers: JUnit, coverage XML, LCOV and markdown
#[allow(clippy::cast_precision_loss, clippy::doc_markdown)]
pub mod emit;

/// Typed snapshot model and its loader
pub mod model;

/// Test outcome classification
#[allow(clippy::cast_precision_loss)]
pub mod outcome;

/// System-test status text report to JUnit
pub mod qa_report;

/// Result and error types
pub mod result;

#[cfg(test)]
mod fixtures;

pub use config::{ReportConfig, ReportFormats};
pub use encoding_rs::Encoding;
pub use coverage::{
    aggregate_environment, aggregate_project, fmt_percent, Column, CoverageReport,
    CoverageSummary, Percentage,
};
pub use emit::{
    format_timestamp, locale_encoding, resolve_encoding, CoverageXmlFormatter, JunitFormatter,
    LcovFormatter, MarkdownFormatter,
};
pub use model::load::{load_project, parse_project};
pub use model::{
    CoverageKinds, Environment, ExecutionStatus, Project, TestCase, Unit,
};
pub use outcome::{
    classify_environment, CbtLookup, Classification, ClassifiedCase, Classify, Outcome,
    OutcomeCounts,
};
pub use qa_report::{convert_status_report, parse_status_report, SystemTestSuite};
pub use result::{ReportError, ReportResult};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::config::*;
    pub use super::coverage::*;
    pub use super::emit::{
        CoverageXmlFormatter, JunitFormatter, LcovFormatter, MarkdownFormatter,
    };
    pub use super::model::load::*;
    pub use super::model::*;
    pub use super::outcome::*;
    pub use super::result::*;
}
