//! Coverage aggregation
//!
//! Rolls the provider's counters up from function to unit to environment
//! (or the whole project) and formats one value per report column.
//!
//! # Columns
//!
//! ```text
//! statement     max-covered statements / statements
//! branch        max-covered branches / branches
//!               (MC/DC branches when MC/DC is enabled)
//! mcdc          MC/DC pairs, unless simplified MC/DC is on
//! basispath     provider supplied (covered, total)
//! function      functions covered / functions
//! functioncall  max-covered calls / calls
//! ```
//!
//! Function and function-call columns are gated: they appear for every
//! unit as soon as any included unit reports them.

mod aggregate;
mod summary;

pub use aggregate::{
    aggregate_environment, aggregate_project, Aggregate, CoverageReport, FunctionReport,
    UnitReport,
};
pub(crate) use aggregate::is_reported;
pub use summary::{fmt_percent, Column, CoverageSummary, Percentage};

#[cfg(test)]
mod tests;
