//! covreport CLI: coverage and test-result reports for CI
//!
//! ## Usage
//!
//! ```bash
//! covreport generate snapshot.json               # Every report
//! covreport generate snapshot.json --lcov        # Only the LCOV trace
//! covreport junit snapshot.json -e ENV           # One environment
//! covreport system-tests status.txt -o xml_data  # Status text to JUnit
//! covreport config --show                        # Resolved settings
//! ```

use clap::Parser;
use covreport::ReportFormats;
use covreport_cli::{handlers, logging, Cli, CliConfig, CliResult, Commands, Verbosity};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    // Build configuration from CLI args
    let config = build_config(&cli);
    logging::init(&config)?;

    match cli.command {
        Commands::Generate(args) => {
            handlers::execute_reports(&config, &args.snapshot, &args.report, args.formats())
                .map(drop)
        }
        Commands::Junit(args) => handlers::execute_reports(
            &config,
            &args.snapshot,
            &args.report,
            only(|f| f.junit = true),
        )
        .map(drop),
        Commands::Coverage(args) => handlers::execute_reports(
            &config,
            &args.snapshot,
            &args.report,
            only(|f| f.coverage = true),
        )
        .map(drop),
        Commands::Lcov(args) => handlers::execute_reports(
            &config,
            &args.snapshot,
            &args.report,
            only(|f| f.lcov = true),
        )
        .map(drop),
        Commands::Markdown(args) => handlers::execute_reports(
            &config,
            &args.snapshot,
            &args.report,
            only(|f| f.markdown = true),
        )
        .map(drop),
        Commands::SystemTests(args) => handlers::execute_system_tests(&config, &args).map(drop),
        Commands::Config(args) => handlers::execute_config(&config, &args),
    }
}

/// A single format, overriding the config file
fn only(select: fn(&mut ReportFormats)) -> Option<ReportFormats> {
    let mut formats = ReportFormats::none();
    select(&mut formats);
    Some(formats)
}

fn build_config(cli: &Cli) -> CliConfig {
    let mut config = CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.into())
        .with_log_format(cli.log_format.into());
    if let Some(ref path) = cli.config {
        config = config.with_config_file(path);
    }
    config
}
