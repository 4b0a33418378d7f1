//! System-test status report parsing.
//!
//! The status report is a text table. Data rows begin on the line after the
//! one following the `Expecteds` header. A row whose third character is not
//! a space opens a new `compiler / testsuite / environment` context; other
//! rows reuse the last one.
//!
//! ```text
//! Compiler     TestSuite   Environment   ...   Expecteds
//! -----------------------------------------------------
//! GNU_9.1 / QA / SYSTEM   x   login_flow  AUTO  Y  4/4  (100%)
//!                             logout_flow AUTO  Y  1/2   (50%)
//!                             manual_flow MAN   N  -
//! ```
//!
//! Each environment becomes one JUnit file.

use crate::emit::encoding;
use crate::emit::{escape_attr, escape_text};
use crate::result::ReportResult;
use encoding_rs::{Encoding, UTF_8};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Last-seen row context, carried over to continuation rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseContext {
    /// Compiler column as written
    pub compiler: String,
    /// Testsuite column
    pub testsuite: String,
    /// Environment column
    pub environment: String,
}

/// One system test row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemTestRow {
    /// Test name, possibly containing spaces
    pub name: String,
    /// `passed/total` column; `None` when not applicable
    pub ratio: Option<String>,
    /// `(NN%)` column; `None` when not applicable
    pub percent: Option<String>,
}

impl SystemTestRow {
    /// A row passes when it has no percentage or is at 100%
    #[must_use]
    pub fn passed(&self) -> bool {
        self.percent.as_deref().map_or(true, |p| p == "(100%)")
    }

    /// Split the test-data tokens of a row
    fn parse(tokens: &[&str]) -> Option<Self> {
        match tokens {
            [.., last] if *last == "-" => {
                let name_len = tokens.len().checked_sub(3)?;
                Some(Self {
                    name: tokens[..name_len].join(" "),
                    ratio: None,
                    percent: None,
                })
            }
            [.., ratio, percent] => {
                let name_len = tokens.len().checked_sub(4)?;
                Some(Self {
                    name: tokens[..name_len].join(" "),
                    ratio: Some((*ratio).to_string()),
                    percent: Some((*percent).to_string()),
                })
            }
            _ => None,
        }
    }
}

/// Rows of one environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemTestSuite {
    /// Compiler with dots and spaces removed
    pub compiler: String,
    /// Testsuite name
    pub testsuite: String,
    /// Environment name
    pub environment: String,
    /// Rows in report order
    pub rows: Vec<SystemTestRow>,
}

impl SystemTestSuite {
    fn open(context: &ParseContext) -> Self {
        Self {
            compiler: context.compiler.replace(['.', ' '], ""),
            testsuite: context.testsuite.clone(),
            environment: context.environment.clone(),
            rows: Vec::new(),
        }
    }

    /// `test_results_<compiler>_<testsuite>_<env>.xml`
    #[must_use]
    pub fn file_name(&self) -> String {
        format!(
            "test_results_{}_{}_{}.xml",
            self.compiler, self.testsuite, self.environment
        )
    }

    /// `compiler.testsuite.env`
    #[must_use]
    pub fn classname(&self) -> String {
        format!("{}.{}.{}", self.compiler, self.testsuite, self.environment)
    }

    /// Number of passing rows
    #[must_use]
    pub fn passed(&self) -> usize {
        self.rows.iter().filter(|r| r.passed()).count()
    }

    /// Number of failing rows
    #[must_use]
    pub fn failed(&self) -> usize {
        self.rows.len() - self.passed()
    }

    /// Render the JUnit document of this suite
    #[must_use]
    pub fn render(&self, encoding: &'static Encoding) -> String {
        let mut xml = String::new();
        let _ = writeln!(
            xml,
            r#"<?xml version="1.0" encoding="{}"?>"#,
            encoding.name()
        );
        xml.push_str("<testsuites>\n");
        let _ = writeln!(xml, "  <!-- {} -->", escape_text(&self.file_name()));
        let _ = writeln!(
            xml,
            r#"  <testsuite errors="0" tests="{}" failures="{}" name="{}" id="1">"#,
            self.rows.len(),
            self.failed(),
            escape_attr(&self.environment)
        );

        let classname = escape_attr(&self.classname());
        for row in &self.rows {
            let name = escape_attr(&row.name);
            match (&row.ratio, &row.percent) {
                (Some(ratio), Some(percent)) if !row.passed() => {
                    let _ = writeln!(
                        xml,
                        r#"    <testcase name="{name}" classname="{classname}" time="0">"#
                    );
                    let _ = writeln!(
                        xml,
                        r#"      <failure type="failure" message="FAIL: {} {}"/>"#,
                        escape_attr(ratio),
                        escape_attr(percent)
                    );
                    xml.push_str("    </testcase>\n");
                }
                _ => {
                    let _ = writeln!(
                        xml,
                        r#"    <testcase name="{name}" classname="{classname}" time="0"/>"#
                    );
                }
            }
        }

        xml.push_str("  </testsuite>\n");
        xml.push_str("</testsuites>\n");
        xml
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    SeekingHeader,
    SkippingRule,
    Data,
}

/// Fold state of the parser
#[derive(Debug)]
struct ParseState {
    phase: Phase,
    context: Option<ParseContext>,
    suites: Vec<SystemTestSuite>,
}

impl ParseState {
    fn new() -> Self {
        Self {
            phase: Phase::SeekingHeader,
            context: None,
            suites: Vec::new(),
        }
    }

    fn step(mut self, line: &str) -> Self {
        if line.trim().is_empty() {
            return self;
        }
        match self.phase {
            Phase::SeekingHeader => {
                if line.contains("Expecteds") {
                    self.phase = Phase::SkippingRule;
                }
            }
            Phase::SkippingRule => self.phase = Phase::Data,
            Phase::Data => self.data_row(line.trim_end()),
        }
        self
    }

    fn data_row(&mut self, line: &str) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let opens_context = line.as_bytes().get(2).is_some_and(|b| *b != b' ');

        let data = if opens_context {
            let [compiler, _, testsuite, _, environment, ..] = tokens.as_slice() else {
                warn!(line, "row too short for a compiler/testsuite/environment context");
                return;
            };
            self.context = Some(ParseContext {
                compiler: (*compiler).to_string(),
                testsuite: (*testsuite).to_string(),
                environment: (*environment).to_string(),
            });
            tokens.get(6..).unwrap_or_default()
        } else {
            tokens.as_slice()
        };

        let Some(context) = self.context.as_ref() else {
            warn!(line, "continuation row before any environment, skipping");
            return;
        };
        let Some(row) = SystemTestRow::parse(data) else {
            warn!(line, "cannot read test data, skipping row");
            return;
        };

        let starts_suite = self
            .suites
            .last()
            .map_or(true, |s| s.environment != context.environment);
        if starts_suite {
            debug!(environment = %context.environment, "new system test suite");
            self.suites.push(SystemTestSuite::open(context));
        }
        if let Some(suite) = self.suites.last_mut() {
            suite.rows.push(row);
        }
    }
}

/// Parse a status report into per-environment suites
#[must_use]
pub fn parse_status_report(text: &str) -> Vec<SystemTestSuite> {
    text.lines()
        .fold(ParseState::new(), ParseState::step)
        .suites
}

/// Read a status report, decoding it with `encoding`
///
/// # Errors
///
/// Returns error if the file cannot be read
pub fn load_status_report(path: &Path, encoding: &'static Encoding) -> ReportResult<String> {
    let bytes = std::fs::read(path)?;
    let (text, used, had_errors) = encoding.decode(&bytes);
    if had_errors {
        warn!(path = %path.display(), encoding = used.name(), "replaced undecodable bytes");
    }
    Ok(text.into_owned())
}

/// Totals of a written batch of suites
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemTestSummary {
    /// Files written
    pub files: Vec<PathBuf>,
    /// Passing rows across all suites
    pub passed: usize,
    /// Failing rows across all suites
    pub failed: usize,
}

/// Write one JUnit file per suite into `out_dir`
///
/// # Errors
///
/// Returns error if a file cannot be written
pub fn write_suites(
    suites: &[SystemTestSuite],
    out_dir: &Path,
    encoding: &'static Encoding,
) -> ReportResult<SystemTestSummary> {
    let mut summary = SystemTestSummary::default();
    for suite in suites {
        let path = out_dir.join(suite.file_name());
        encoding::write_report(&path, &suite.render(encoding), encoding)?;
        summary.passed += suite.passed();
        summary.failed += suite.failed();
        summary.files.push(path);
    }
    Ok(summary)
}

/// Parse a report file and write its suites as UTF-8 unless told otherwise
///
/// # Errors
///
/// Returns error if the report cannot be read or a file cannot be written
pub fn convert_status_report(
    report: &Path,
    out_dir: &Path,
    encoding: Option<&'static Encoding>,
) -> ReportResult<SystemTestSummary> {
    let encoding = encoding.unwrap_or(UTF_8);
    let text = load_status_report(report, encoding)?;
    let suites = parse_status_report(&text);
    if suites.is_empty() {
        warn!(path = %report.display(), "no system test rows found");
    }
    write_suites(&suites, out_dir, encoding)
}
