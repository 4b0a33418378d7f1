//! Per-kind coverage counters.

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Possible-vs-covered counter for one coverage kind.
///
/// `max_covered` is the ceiling some kinds report separately from the
/// achieved `covered` count. Totals and percentages use `max_covered`,
/// per-line hit/miss decisions use `covered` first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    /// Number of coverable items
    #[serde(default)]
    pub total: u64,
    /// Items covered by the current results
    #[serde(default)]
    pub covered: u64,
    /// Highest covered count the provider reports
    #[serde(default)]
    pub max_covered: u64,
}

impl Counter {
    /// Create a counter
    #[must_use]
    pub const fn new(total: u64, covered: u64, max_covered: u64) -> Self {
        Self {
            total,
            covered,
            max_covered,
        }
    }

    /// Counter where covered and max-covered agree
    #[must_use]
    pub const fn of(covered: u64, total: u64) -> Self {
        Self::new(total, covered, covered)
    }
}

impl Add for Counter {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            total: self.total + rhs.total,
            covered: self.covered + rhs.covered,
            max_covered: self.max_covered + rhs.max_covered,
        }
    }
}

impl AddAssign for Counter {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Six orthogonal coverage counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    /// Statement coverage
    #[serde(default)]
    pub statements: Counter,
    /// Branch coverage
    #[serde(default)]
    pub branches: Counter,
    /// MC/DC branch coverage
    #[serde(default)]
    pub mcdc_branches: Counter,
    /// MC/DC pair coverage
    #[serde(default)]
    pub mcdc_pairs: Counter,
    /// Function coverage
    #[serde(default)]
    pub functions: Counter,
    /// Function call coverage
    #[serde(default)]
    pub function_calls: Counter,
}

impl Metrics {
    /// Empty metrics
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set statement counters
    #[must_use]
    pub const fn with_statements(mut self, counter: Counter) -> Self {
        self.statements = counter;
        self
    }

    /// Set branch counters
    #[must_use]
    pub const fn with_branches(mut self, counter: Counter) -> Self {
        self.branches = counter;
        self
    }

    /// Set MC/DC branch counters
    #[must_use]
    pub const fn with_mcdc_branches(mut self, counter: Counter) -> Self {
        self.mcdc_branches = counter;
        self
    }

    /// Set MC/DC pair counters
    #[must_use]
    pub const fn with_mcdc_pairs(mut self, counter: Counter) -> Self {
        self.mcdc_pairs = counter;
        self
    }

    /// Set function counters
    #[must_use]
    pub const fn with_functions(mut self, counter: Counter) -> Self {
        self.functions = counter;
        self
    }

    /// Set function call counters
    #[must_use]
    pub const fn with_function_calls(mut self, counter: Counter) -> Self {
        self.function_calls = counter;
        self
    }

    const fn counters(&self) -> [Counter; 6] {
        [
            self.statements,
            self.branches,
            self.mcdc_branches,
            self.mcdc_pairs,
            self.functions,
            self.function_calls,
        ]
    }

    /// Number of coverable items across all kinds
    #[must_use]
    pub fn coverable(&self) -> u64 {
        self.counters().iter().map(|c| c.total).sum()
    }

    /// Whether anything at all is instrumented here
    #[must_use]
    pub fn has_any_coverage(&self) -> bool {
        self.coverable() > 0
    }

    /// Whether anything is covered, by either the achieved or max count
    #[must_use]
    pub fn has_anything_covered(&self) -> bool {
        self.counters()
            .iter()
            .any(|c| c.covered > 0 || c.max_covered > 0)
    }

    /// Number of branch-like coverable items (branch, MC/DC branch, MC/DC pair)
    #[must_use]
    pub fn branch_points(&self) -> u64 {
        self.branches.total + self.mcdc_branches.total + self.mcdc_pairs.total
    }

    /// Covered branch-like items; falls back to max-covered when nothing is
    /// covered in the current results.
    #[must_use]
    pub fn branches_taken(&self) -> u64 {
        let covered =
            self.branches.covered + self.mcdc_branches.covered + self.mcdc_pairs.covered;
        if covered > 0 {
            return covered;
        }
        self.branches.max_covered + self.mcdc_branches.max_covered + self.mcdc_pairs.max_covered
    }
}

impl Add for Metrics {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            statements: self.statements + rhs.statements,
            branches: self.branches + rhs.branches,
            mcdc_branches: self.mcdc_branches + rhs.mcdc_branches,
            mcdc_pairs: self.mcdc_pairs + rhs.mcdc_pairs,
            functions: self.functions + rhs.functions,
            function_calls: self.function_calls + rhs.function_calls,
        }
    }
}

impl AddAssign for Metrics {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Metrics {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl<'a> Sum<&'a Self> for Metrics {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
