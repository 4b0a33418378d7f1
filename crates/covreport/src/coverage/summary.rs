//! Formatted per-kind coverage values.

use std::fmt;

/// Percentage rounded to two places, printed without trailing zeros
/// (`80`, `66.67`, `12.5`). Returns `None` when `total` is zero.
#[must_use]
pub fn fmt_percent(covered: u64, total: u64) -> Option<String> {
    Percentage::new(covered, total).map(|p| p.percent_text())
}

/// A covered/total pair with a non-zero total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Percentage {
    covered: u64,
    total: u64,
}

impl Percentage {
    /// Create a value; a zero total has no percentage
    #[must_use]
    pub const fn new(covered: u64, total: u64) -> Option<Self> {
        if total == 0 {
            None
        } else {
            Some(Self { covered, total })
        }
    }

    /// Covered count
    #[must_use]
    pub const fn covered(&self) -> u64 {
        self.covered
    }

    /// Total count
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Percentage rounded to two decimal places
    #[must_use]
    pub fn value(&self) -> f64 {
        let raw = 100.0 * self.covered as f64 / self.total as f64;
        (raw * 100.0).round() / 100.0
    }

    fn percent_text(self) -> String {
        // f64 Display already drops trailing zeros ("80", "12.5")
        format!("{}", self.value())
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}% ({} / {})",
            self.percent_text(),
            self.covered,
            self.total
        )
    }
}

/// Report column of a coverage summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Statement coverage
    Statement,
    /// Branch coverage (MC/DC branches when MC/DC is enabled)
    Branch,
    /// MC/DC pair coverage
    Mcdc,
    /// Basis-path coverage
    BasisPath,
    /// Function coverage
    Function,
    /// Function call coverage
    FunctionCall,
}

impl Column {
    /// Columns in report order
    pub const ALL: [Self; 6] = [
        Self::Statement,
        Self::Branch,
        Self::Mcdc,
        Self::BasisPath,
        Self::Function,
        Self::FunctionCall,
    ];

    /// Key used in the coverage XML `type` attribute
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Statement => "statement",
            Self::Branch => "branch",
            Self::Mcdc => "mcdc",
            Self::BasisPath => "basispath",
            Self::Function => "function",
            Self::FunctionCall => "functioncall",
        }
    }
}

/// Coverage of one scope, one optional value per column.
///
/// `None` means the column does not apply to the scope, which is
/// different from a 0% value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageSummary {
    /// Statement coverage
    pub statement: Option<Percentage>,
    /// Branch coverage
    pub branch: Option<Percentage>,
    /// MC/DC pair coverage
    pub mcdc: Option<Percentage>,
    /// Basis-path coverage
    pub basispath: Option<Percentage>,
    /// Function coverage
    pub function: Option<Percentage>,
    /// Function call coverage
    pub functioncall: Option<Percentage>,
}

impl CoverageSummary {
    /// Value of one column
    #[must_use]
    pub const fn get(&self, column: Column) -> Option<Percentage> {
        match column {
            Column::Statement => self.statement,
            Column::Branch => self.branch,
            Column::Mcdc => self.mcdc,
            Column::BasisPath => self.basispath,
            Column::Function => self.function,
            Column::FunctionCall => self.functioncall,
        }
    }

    /// Formatted value of one column
    #[must_use]
    pub fn formatted(&self, column: Column) -> Option<String> {
        self.get(column).map(|p| p.to_string())
    }

    /// Columns that have a value, in report order
    pub fn present(&self) -> impl Iterator<Item = (Column, Percentage)> + '_ {
        Column::ALL
            .into_iter()
            .filter_map(|c| self.get(c).map(|p| (c, p)))
    }

    /// Whether no column has a value
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.present().next().is_none()
    }
}
