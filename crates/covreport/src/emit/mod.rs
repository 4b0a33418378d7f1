//! Report emitters
//!
//! Each formatter reads the aggregated model, renders its whole file into
//! a string and only then writes it, so a file is never half-written.
//!
//! | Formatter | Output |
//! |-----------|--------|
//! | [`JunitFormatter`] | `test_results_<env>.xml` |
//! | [`CoverageXmlFormatter`] | `coverage_results_<env>.xml`, `project_coverage_results_<project>.xml` |
//! | [`LcovFormatter`] | `lcov/<project>.info` |
//! | [`MarkdownFormatter`] | `<project>_summary.md` |

pub mod coverage_xml;
pub mod encoding;
pub mod junit;
pub mod lcov;
pub mod markdown;

pub use coverage_xml::{format_timestamp, CoverageXmlFormatter};
pub use encoding::{locale_encoding, resolve_encoding, write_report};
pub use junit::JunitFormatter;
pub use lcov::LcovFormatter;
pub use markdown::MarkdownFormatter;

use quick_xml::escape::{escape, partial_escape};

/// Escape `& < >` for element text and attribute values known to hold no
/// quotes
pub(crate) fn escape_text(text: &str) -> String {
    partial_escape(text).into_owned()
}

/// Escape `& < > ' "` for attribute values
pub(crate) fn escape_attr(text: &str) -> String {
    escape(text).into_owned()
}

/// Message text for JUnit attributes and bodies: escaped, quotes removed,
/// newlines as character references
pub(crate) fn escape_message(text: &str) -> String {
    escape_text(text).replace('"', "").replace('\n', "&#xA;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text_keeps_quotes() {
        assert_eq!(escape_text(r#"a < b & "c""#), r#"a &lt; b &amp; "c""#);
    }

    #[test]
    fn test_escape_attr_escapes_quotes() {
        assert_eq!(escape_attr(r#"f("x")"#), "f(&quot;x&quot;)");
    }

    #[test]
    fn test_escape_message() {
        assert_eq!(
            escape_message("FAIL 1 / 2\nexpected \"a\" < b"),
            "FAIL 1 / 2&#xA;expected a &lt; b"
        );
    }
}
