//! Snapshot report handler: JUnit, coverage XML, LCOV and markdown

use crate::commands::ReportArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::handlers::config::resolve_report_config;
use crate::output::ProgressReporter;
use covreport::{
    aggregate_environment, aggregate_project, classify_environment, load_project, CbtLookup,
    CoverageXmlFormatter, Encoding, JunitFormatter, LcovFormatter, MarkdownFormatter, Project,
    ReportConfig, ReportError, ReportFormats, ReportResult,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Files written and emitters that failed during one run
#[derive(Debug, Default)]
pub struct ReportRun {
    /// Files written
    pub written: Vec<PathBuf>,
    /// Files that could not be written, with the cause
    pub failed: Vec<(PathBuf, ReportError)>,
}

impl ReportRun {
    /// Record the result of one emitter and keep going
    fn record(&mut self, reporter: &ProgressReporter, path: PathBuf, result: ReportResult<()>) {
        match result {
            Ok(()) => {
                reporter.wrote(&path);
                self.written.push(path);
            }
            Err(e) => {
                reporter.failure(&format!("{}: {e}", path.display()));
                self.failed.push((path, e));
            }
        }
    }

    /// Whether every emitter succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Error for a run with failed emitters
    pub fn into_result(self) -> CliResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(CliError::report_generation(format!(
                "{} of {} reports could not be written",
                self.failed.len(),
                self.failed.len() + self.written.len()
            )))
        }
    }
}

/// Keep only the environment named `name`
fn select_environment(project: &mut Project, name: &str) -> CliResult<()> {
    project.environments.retain(|env| env.name == name);
    if project.environments.is_empty() {
        return Err(CliError::invalid_argument(format!(
            "environment '{name}' not found in project '{}'",
            project.name
        )));
    }
    Ok(())
}

/// Write the selected reports of `project` under `config.output_dir`.
///
/// Per-environment reports come first, then the project reports. A failed
/// emitter is recorded and the others still run.
pub fn write_reports(
    project: &Project,
    cbt: &CbtLookup,
    config: &ReportConfig,
    encoding: &'static Encoding,
    reporter: &mut ProgressReporter,
) -> ReportRun {
    let formats = config.formats;
    let mut run = ReportRun::default();

    if formats.junit || formats.coverage {
        reporter.start_progress(project.environments.len() as u64, "environments");
        for env in &project.environments {
            reporter.set_message(&env.name);
            debug!(environment = %env.name, "writing environment reports");

            if formats.junit {
                let cases = classify_environment(env, cbt);
                let junit = JunitFormatter::new(env, &cases).with_encoding(encoding);
                let counts = junit.counts();
                info!(
                    environment = %env.name,
                    tests = counts.tests,
                    failures = counts.failures,
                    errors = counts.errors,
                    "classified test cases"
                );
                let path = config.junit_path(&env.name);
                let result = junit.save(&path);
                run.record(reporter, path, result);
            }

            if formats.coverage {
                if let Some(report) = aggregate_environment(project, env) {
                    let path = config.coverage_path(&env.name);
                    let result = CoverageXmlFormatter::environment(&report)
                        .with_encoding(encoding)
                        .save(&path);
                    run.record(reporter, path, result);
                } else {
                    reporter.warning(&format!(
                        "{}: no coverage information, coverage report skipped",
                        env.name
                    ));
                }
            }

            reporter.increment(1);
        }
        reporter.finish();
    }

    if formats.coverage || formats.markdown {
        let report = aggregate_project(project);

        if formats.coverage {
            let path = config.project_coverage_path(&project.name);
            let result = CoverageXmlFormatter::project(&report)
                .with_encoding(encoding)
                .save(&path);
            run.record(reporter, path, result);
        }

        if formats.markdown {
            let path = config.markdown_path(&project.name);
            let result = MarkdownFormatter::new(&report)
                .with_encoding(encoding)
                .save(&path);
            run.record(reporter, path, result);
        }
    }

    if formats.lcov {
        let path = config.lcov_path(&project.name);
        let result = LcovFormatter::new(project)
            .with_source_root(config.source_root.clone())
            .with_project_dir(config.resolved_project_dir())
            .with_encoding(encoding)
            .save(&path);
        run.record(reporter, path, result);
    }

    run
}

/// Load the snapshot and the CBT file, then write the selected reports.
///
/// `formats` overrides the formats of the config file when given.
pub fn execute_reports(
    cli: &CliConfig,
    snapshot: &Path,
    args: &ReportArgs,
    formats: Option<ReportFormats>,
) -> CliResult<ReportRun> {
    let mut config = resolve_report_config(cli, args)?;
    if let Some(formats) = formats {
        config.formats = formats;
    }
    if config.formats.is_empty() {
        return Err(CliError::invalid_argument("no report format selected"));
    }

    let encoding = config.output_encoding()?;
    let mut project = load_project(snapshot)?;
    if let Some(ref name) = config.environment {
        select_environment(&mut project, name)?;
    }
    let cbt = match config.cbt {
        Some(ref path) => CbtLookup::load(path)?,
        None => CbtLookup::empty(),
    };

    let mut reporter = ProgressReporter::new(cli.color.should_color(), cli.verbosity.is_quiet());
    reporter.info(&format!(
        "{}: {} environment(s) -> {}",
        project.name,
        project.environments.len(),
        config.output_dir.display()
    ));

    let run = write_reports(&project, &cbt, &config, encoding, &mut reporter);
    reporter.summary(run.written.len(), run.failed.len());
    run.into_result()
}
