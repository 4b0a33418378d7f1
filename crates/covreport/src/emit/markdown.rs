//! Markdown coverage summary for merge-request comments.
//!
//! ```text
//! ## Summary
//! Overall Coverage: FN ✅ | ST 🟡 | BR  | PR  | FC
//!
//! ## Annotations
//! | File | Summary | Severity |
//! |------|----------|-----------|
//! | manager.c | FN ✅ | ST 🟡 | BR  | PR  | FC  | MEDIUM |
//! ```

use super::encoding;
use crate::coverage::{Column, CoverageReport, CoverageSummary, Percentage};
use crate::result::ReportResult;
use encoding_rs::{Encoding, UTF_8};
use std::fmt::{self, Write};
use std::path::Path;

/// Columns of the summary row, with their labels
const COLUMNS: [(&str, Column); 5] = [
    ("FN", Column::Function),
    ("ST", Column::Statement),
    ("BR", Column::Branch),
    ("PR", Column::Mcdc),
    ("FC", Column::FunctionCall),
];

/// Mark and severity weight of one percentage
fn mark(value: Percentage) -> (&'static str, i32) {
    let pct = value.value();
    if pct >= 100.0 {
        ("\u{2705}", -1)
    } else if pct >= 80.0 {
        ("\u{2705}", 0)
    } else if pct >= 50.0 {
        ("\u{1f7e1}", 1)
    } else if pct > 0.0 {
        ("\u{1f7e1}", 2)
    } else {
        ("\u{274c}", 3)
    }
}

/// How urgently a file needs more tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Mean weight ≤ 0
    Low,
    /// Mean weight ≤ 0.75
    Medium,
    /// Mean weight ≤ 1.75
    High,
    /// Anything worse
    Critical,
}

impl Severity {
    fn from_weights(weights: &[i32]) -> Self {
        if weights.is_empty() {
            return Self::Low;
        }
        let mean = f64::from(weights.iter().sum::<i32>()) / weights.len() as f64;
        if mean <= 0.0 {
            Self::Low
        } else if mean <= 0.75 {
            Self::Medium
        } else if mean <= 1.75 {
            Self::High
        } else {
            Self::Critical
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        })
    }
}

/// Marked columns joined with ` | `, and the resulting severity
fn marks(summary: &CoverageSummary) -> (String, Severity) {
    let mut weights = Vec::new();
    let cells: Vec<String> = COLUMNS
        .iter()
        .map(|(label, column)| match summary.get(*column) {
            Some(value) => {
                let (symbol, weight) = mark(value);
                weights.push(weight);
                format!("{label} {symbol}")
            }
            None => format!("{label} "),
        })
        .collect();
    (cells.join(" | "), Severity::from_weights(&weights))
}

/// Markdown summary of an aggregated report
#[derive(Debug)]
pub struct MarkdownFormatter<'a> {
    report: &'a CoverageReport,
    encoding: &'static Encoding,
}

impl<'a> MarkdownFormatter<'a> {
    /// Create a formatter
    #[must_use]
    pub fn new(report: &'a CoverageReport) -> Self {
        Self {
            report,
            encoding: UTF_8,
        }
    }

    /// Set the output encoding
    #[must_use]
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Generate the markdown text
    #[must_use]
    pub fn generate(&self) -> String {
        let mut md = String::new();
        let (overall, _) = marks(&self.report.total);
        md.push_str("## Summary\n");
        let _ = writeln!(md, "Overall Coverage: {overall}");
        md.push('\n');
        md.push_str("## Annotations\n");
        md.push_str("| File | Summary | Severity |\n");
        md.push_str("|------|----------|-----------|\n");
        for unit in &self.report.units {
            let (row, severity) = marks(&unit.summary);
            let _ = writeln!(md, "| {} | {row} | {severity} |", unit.display_name);
        }
        md
    }

    /// Write the summary
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn save(&self, path: &Path) -> ReportResult<()> {
        encoding::write_report(path, &self.generate(), self.encoding)
    }
}
