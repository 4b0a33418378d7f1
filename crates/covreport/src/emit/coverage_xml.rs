//! Coverage summary XML.
//!
//! Two shapes share the per-column `coverage` lines. The environment form
//! nests units and subprograms:
//!
//! ```text
//! <!-- covreport coverage results, Generated 17 OCT 2026  3:04:05 PM -->
//! <report>
//!   <version value="3"/>
//!   <stats>
//!     <environments value="1"/>
//!     <units value="1"/>
//!     <subprograms value="2"/>
//!   </stats>
//!   <data>
//!     <all name="all environments">
//!       <coverage type="statement, %" value="80% (8 / 10)"/>
//!       <coverage type="complexity, %" value="0% (3 / 0)"/>
//!
//!       <environment name="ENV">
//!         ...
//!         <unit name="manager">
//!           ...
//!           <subprogram name="Add_Party">
//!             ...
//!           </subprogram>
//!         </unit>
//!       </environment>
//!     </all>
//!   </data>
//! </report>
//! ```
//!
//! The project form only carries `combined-coverage` totals.

use super::{encoding, escape_attr};
use crate::coverage::{CoverageReport, CoverageSummary};
use crate::result::ReportResult;
use chrono::{Local, NaiveDateTime, Timelike};
use encoding_rs::{Encoding, UTF_8};
use std::fmt::Write;
use std::path::Path;

/// Generation time as `17 OCT 2026  3:04:05 PM`
#[must_use]
pub fn format_timestamp(at: NaiveDateTime) -> String {
    let hour = if at.hour() > 12 {
        at.hour() - 12
    } else {
        at.hour()
    };
    format!(
        "{}  {hour}:{}",
        at.format("%d %b %Y"),
        at.format("%M:%S %p")
    )
    .to_uppercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Form {
    Environment,
    Project,
}

/// Coverage XML of one environment or of the whole project
#[derive(Debug)]
pub struct CoverageXmlFormatter<'a> {
    report: &'a CoverageReport,
    form: Form,
    generated: NaiveDateTime,
    encoding: &'static Encoding,
}

impl<'a> CoverageXmlFormatter<'a> {
    fn new(report: &'a CoverageReport, form: Form) -> Self {
        Self {
            report,
            form,
            generated: Local::now().naive_local(),
            encoding: UTF_8,
        }
    }

    /// Environment form with units and subprograms
    #[must_use]
    pub fn environment(report: &'a CoverageReport) -> Self {
        Self::new(report, Form::Environment)
    }

    /// Project form with combined totals only
    #[must_use]
    pub fn project(report: &'a CoverageReport) -> Self {
        Self::new(report, Form::Project)
    }

    /// Set the generation time written in the header comment
    #[must_use]
    pub fn with_timestamp(mut self, generated: NaiveDateTime) -> Self {
        self.generated = generated;
        self
    }

    /// Set the output encoding
    #[must_use]
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Generate the report text
    #[must_use]
    pub fn generate(&self) -> String {
        let mut xml = String::new();
        let _ = writeln!(
            xml,
            "<!-- covreport coverage results, Generated {} -->",
            format_timestamp(self.generated)
        );
        xml.push_str("<report>\n");
        xml.push_str("  <version value=\"3\"/>\n");
        match self.form {
            Form::Environment => self.write_environment(&mut xml),
            Form::Project => self.write_project(&mut xml),
        }
        xml.push_str("</report>");
        xml
    }

    fn write_environment(&self, xml: &mut String) {
        let report = self.report;
        xml.push_str("  <stats>\n");
        xml.push_str("    <environments value=\"1\"/>\n");
        let _ = writeln!(xml, "    <units value=\"{}\"/>", report.units.len());
        let _ = writeln!(
            xml,
            "    <subprograms value=\"{}\"/>",
            report.function_count()
        );
        xml.push_str("  </stats>\n");
        xml.push_str("  <data>\n");
        xml.push_str("    <all name=\"all environments\">\n");
        write_coverage(xml, 6, "coverage", &report.total, report.complexity());
        xml.push('\n');

        let _ = writeln!(
            xml,
            "      <environment name=\"{}\">",
            escape_attr(&report.name)
        );
        write_coverage(xml, 8, "coverage", &report.total, report.complexity());
        xml.push('\n');

        for unit in &report.units {
            let _ = writeln!(xml, "        <unit name=\"{}\">", escape_attr(&unit.name));
            write_coverage(xml, 10, "coverage", &unit.summary, unit.complexity);
            for function in &unit.functions {
                let _ = writeln!(
                    xml,
                    "          <subprogram name=\"{}\">",
                    escape_attr(&function.name)
                );
                write_coverage(
                    xml,
                    12,
                    "coverage",
                    &function.summary,
                    i64::from(function.complexity.max(0)),
                );
                xml.push_str("          </subprogram>\n");
            }
            xml.push_str("        </unit>\n");
        }

        xml.push_str("      </environment>\n");
        xml.push_str("    </all>\n");
        xml.push_str("  </data>\n");
    }

    fn write_project(&self, xml: &mut String) {
        let _ = writeln!(
            xml,
            "  <combined-coverage type=\"complexity, %\" value=\"0% ({} / 0)\"/>",
            self.report.complexity()
        );
        for (column, value) in self.report.total.present() {
            let _ = writeln!(
                xml,
                "  <combined-coverage type=\"{}, %\" value=\"{value}\"/>",
                column.key()
            );
        }
    }

    /// Write the report
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn save(&self, path: &Path) -> ReportResult<()> {
        encoding::write_report(path, &self.generate(), self.encoding)
    }
}

/// Present columns, then the complexity line
fn write_coverage(
    xml: &mut String,
    indent: usize,
    tag: &str,
    summary: &CoverageSummary,
    complexity: i64,
) {
    let pad = " ".repeat(indent);
    for (column, value) in summary.present() {
        let _ = writeln!(
            xml,
            "{pad}<{tag} type=\"{}, %\" value=\"{value}\"/>",
            column.key()
        );
    }
    let _ = writeln!(
        xml,
        "{pad}<{tag} type=\"complexity, %\" value=\"0% ({complexity} / 0)\"/>"
    );
}
