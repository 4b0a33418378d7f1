//! JUnit XML test results.
//!
//! ## Format
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <testsuites>
//!     <testsuite errors="0" tests="2" failures="1" name="ENV" id="1">
//!         <testcase name="manager.Add_Party.TC1" classname="GNU_Native.TestSuite.ENV" time="0.0" file="" status="failed">
//!             <failure type="failure" message="FAIL 1 / 2&#xA;..."/>
//!             <system-out>
//! FAIL 1 / 2&#xA;...
//!             </system-out>
//!         </testcase>
//!    </testsuite>
//! </testsuites>
//! ```

use super::{encoding, escape_attr, escape_message};
use crate::model::Environment;
use crate::outcome::{ClassifiedCase, Outcome, OutcomeCounts};
use crate::result::ReportResult;
use encoding_rs::{Encoding, UTF_8};
use std::fmt::Write;
use std::path::Path;

/// JUnit report of one environment
#[derive(Debug)]
pub struct JunitFormatter<'a> {
    env: &'a Environment,
    cases: &'a [ClassifiedCase<'a>],
    encoding: &'static Encoding,
}

impl<'a> JunitFormatter<'a> {
    /// Create a formatter over already classified cases
    #[must_use]
    pub fn new(env: &'a Environment, cases: &'a [ClassifiedCase<'a>]) -> Self {
        Self {
            env,
            cases,
            encoding: UTF_8,
        }
    }

    /// Set the output encoding named in the XML declaration
    #[must_use]
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Counts written on the `<testsuite>` element
    #[must_use]
    pub fn counts(&self) -> OutcomeCounts {
        OutcomeCounts::of(self.cases)
    }

    /// Generate the report text
    #[must_use]
    pub fn generate(&self) -> String {
        let mut xml = String::new();
        let counts = self.counts();

        let _ = writeln!(
            xml,
            r#"<?xml version="1.0" encoding="{}"?>"#,
            self.encoding.name()
        );
        xml.push_str("<testsuites>\n");
        let _ = writeln!(
            xml,
            r#"    <testsuite errors="{}" tests="{}" failures="{}" name="{}" id="1">"#,
            counts.errors,
            counts.tests,
            counts.failures,
            escape_attr(&self.env.name)
        );

        let classname = escape_attr(&self.env.classname());
        for case in self.cases {
            self.write_case(&mut xml, &classname, case);
        }

        xml.push_str("   </testsuite>\n");
        xml.push_str("</testsuites>\n");
        xml
    }

    fn write_case(&self, xml: &mut String, classname: &str, case: &ClassifiedCase<'_>) {
        let c = &case.classification;
        let message = escape_message(&c.message);

        let _ = writeln!(
            xml,
            r#"        <testcase name="{}" classname="{classname}" time="{:?}" file="{}" status="{}">"#,
            escape_attr(&case.name),
            c.time_secs,
            escape_attr(case.file.unwrap_or_default()),
            c.outcome
        );
        match c.outcome {
            Outcome::Failed => {
                let _ = writeln!(
                    xml,
                    r#"            <failure type="failure" message="{message}"/>"#
                );
            }
            Outcome::Error => {
                let _ = writeln!(xml, r#"            <failure type="error" message="{message}"/>"#);
            }
            Outcome::Skipped => {
                let _ = writeln!(xml, r#"            <skipped message="{message}"/>"#);
            }
            Outcome::Passed | Outcome::NotRun => {}
        }
        let _ = writeln!(
            xml,
            "            <system-out>\n{message}\n            </system-out>"
        );
        xml.push_str("        </testcase>\n");
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
