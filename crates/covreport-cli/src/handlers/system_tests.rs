//! System-tests command handler

use crate::commands::{ReportArgs, SystemTestsArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::handlers::config::resolve_report_config;
use crate::output::ProgressReporter;
use covreport::qa_report::SystemTestSummary;
use covreport::{convert_status_report, resolve_encoding};

/// Convert a status text report into one JUnit file per suite
pub fn execute_system_tests(
    cli: &CliConfig,
    args: &SystemTestsArgs,
) -> CliResult<SystemTestSummary> {
    if !args.report.is_file() {
        return Err(CliError::invalid_argument(format!(
            "status report not found: {}",
            args.report.display()
        )));
    }

    let report_args = ReportArgs {
        output_dir: args.output_dir.clone(),
        ..ReportArgs::default()
    };
    let config = resolve_report_config(cli, &report_args)?;
    // The status report is UTF-8 unless told otherwise; the locale does not apply
    let encoding = match args.encoding {
        Some(ref label) => Some(resolve_encoding(Some(label.as_str()))?),
        None => None,
    };

    let reporter = ProgressReporter::new(cli.color.should_color(), cli.verbosity.is_quiet());
    let summary = convert_status_report(&args.report, &config.output_dir, encoding)?;
    for path in &summary.files {
        reporter.wrote(path);
    }
    if summary.files.is_empty() {
        reporter.warning("no system test rows found");
    }
    reporter.info(&format!(
        "{} passed, {} failed",
        summary.passed, summary.failed
    ));
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Verbosity;

    #[test]
    fn test_missing_report_is_invalid_argument() {
        let dir = tempfile::tempdir().unwrap();
        let args = SystemTestsArgs {
            report: dir.path().join("missing.txt"),
            output_dir: Some(dir.path().to_path_buf()),
            encoding: None,
        };
        let err = execute_system_tests(&CliConfig::new(), &args).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument { .. }));
    }

    #[test]
    fn test_unknown_encoding_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("status.txt");
        std::fs::write(&report, "").unwrap();
        let args = SystemTestsArgs {
            report,
            output_dir: Some(dir.path().to_path_buf()),
            encoding: Some("klingon".into()),
        };
        let cli = CliConfig::new().with_verbosity(Verbosity::Quiet);
        let err = execute_system_tests(&cli, &args).unwrap_err();
        assert!(matches!(err, CliError::Report(_)));
    }

    #[test]
    fn test_converts_rows() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("status.txt");
        std::fs::write(
            &report,
            "Compiler     TestSuite   Environment   Test   Type  Run  Expecteds\n\
             -------------------------------------------------------------------\n\
             GNU_9.1 / QA / SYSTEM   x   login flow  AUTO  Y  4/4  (100%)\n",
        )
        .unwrap();
        let out = dir.path().join("out");
        let args = SystemTestsArgs {
            report,
            output_dir: Some(out.clone()),
            encoding: None,
        };
        let cli = CliConfig::new().with_verbosity(Verbosity::Quiet);
        let summary = execute_system_tests(&cli, &args).unwrap();
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.files.len(), 1);
        assert!(summary.files[0].starts_with(&out));
    }
}
