//! Output text encoding.
//!
//! Reports are written in the locale's encoding. Characters the encoding
//! cannot represent are replaced instead of failing the write.

use crate::result::{ReportError, ReportResult};
use encoding_rs::{Encoding, UTF_8};
use std::path::Path;
use tracing::{debug, info};

const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_CTYPE", "LANG"];

/// Charset part of a locale string (`en_US.UTF-8@euro` → `UTF-8`)
fn locale_charset(locale: &str) -> Option<&str> {
    let (_, rest) = locale.split_once('.')?;
    let charset = rest.split('@').next().unwrap_or(rest);
    if charset.is_empty() {
        None
    } else {
        Some(charset)
    }
}

/// Encoding named by the first set locale variable, looked up through
/// `lookup`. Falls back to UTF-8.
pub fn encoding_from_env<F>(lookup: F) -> &'static Encoding
where
    F: Fn(&str) -> Option<String>,
{
    let locale = LOCALE_VARS
        .iter()
        .filter_map(|var| lookup(var))
        .find(|value| !value.is_empty());
    let encoding = locale
        .as_deref()
        .and_then(locale_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    // encoding_rs cannot encode into UTF-16, it writes UTF-8 instead
    encoding.output_encoding()
}

/// Encoding of the current process locale
#[must_use]
pub fn locale_encoding() -> &'static Encoding {
    encoding_from_env(|var| std::env::var(var).ok())
}

/// Resolve a configured label, or the locale when none is configured
///
/// # Errors
///
/// Returns error if the label is not a known encoding
pub fn resolve_encoding(label: Option<&str>) -> ReportResult<&'static Encoding> {
    match label {
        Some(label) => Encoding::for_label(label.trim().as_bytes())
            .map(Encoding::output_encoding)
            .ok_or_else(|| ReportError::Encoding {
                label: label.to_string(),
            }),
        None => Ok(locale_encoding()),
    }
}

/// Encode text, replacing characters the encoding cannot represent
#[must_use]
pub fn encode(text: &str, encoding: &'static Encoding) -> Vec<u8> {
    let (bytes, used, had_errors) = encoding.encode(text);
    if had_errors {
        debug!(encoding = used.name(), "replaced characters the encoding cannot represent");
    }
    bytes.into_owned()
}

/// Write an encoded report, creating parent directories
///
/// # Errors
///
/// Returns error if the directory or file cannot be written
pub fn write_report(path: &Path, text: &str, encoding: &'static Encoding) -> ReportResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, encode(text, encoding))?;
    info!(path = %path.display(), encoding = encoding.name(), "report written");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;

    fn env_of(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |var| {
            pairs
                .iter()
                .find(|(k, _)| *k == var)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn test_locale_charset() {
        assert_eq!(locale_charset("en_US.UTF-8"), Some("UTF-8"));
        assert_eq!(locale_charset("de_DE.ISO-8859-1@euro"), Some("ISO-8859-1"));
        assert_eq!(locale_charset("C"), None);
    }

    #[test]
    fn test_lc_all_wins() {
        let enc = encoding_from_env(env_of(&[
            ("LANG", "en_US.UTF-8"),
            ("LC_ALL", "en_US.ISO-8859-1"),
        ]));
        assert_eq!(enc, WINDOWS_1252);
    }

    #[test]
    fn test_default_is_utf8() {
        assert_eq!(encoding_from_env(env_of(&[])), UTF_8);
        assert_eq!(encoding_from_env(env_of(&[("LANG", "C")])), UTF_8);
        assert_eq!(encoding_from_env(env_of(&[("LANG", "en.bogus")])), UTF_8);
    }

    #[test]
    fn test_utf16_writes_utf8() {
        assert_eq!(resolve_encoding(Some("utf-16le")).unwrap(), UTF_8);
    }

    #[test]
    fn test_unknown_label_is_error() {
        let err = resolve_encoding(Some("klingon")).unwrap_err();
        assert!(matches!(err, ReportError::Encoding { .. }));
    }

    #[test]
    fn test_encode_replaces_unmappable() {
        let bytes = encode("a\u{2603}b", WINDOWS_1252);
        assert_eq!(bytes, b"a&#9731;b");
        assert_eq!(encode("caf\u{e9}", WINDOWS_1252), b"caf\xe9");
    }

    #[test]
    fn test_write_report_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lcov").join("demo.info");
        write_report(&path, "TN:demo\n", UTF_8).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "TN:demo\n");
    }
}
