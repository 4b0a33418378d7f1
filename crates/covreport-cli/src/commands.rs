//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use covreport::{ReportConfig, ReportFormats};
use std::path::PathBuf;

/// covreport: JUnit, coverage XML, LCOV and markdown from coverage snapshots
#[derive(Parser, Debug)]
#[command(name = "covreport")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Config file (defaults to ./covreport.yaml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write every selected report for a snapshot
    Generate(GenerateArgs),

    /// Write JUnit test results per environment
    Junit(SnapshotArgs),

    /// Write coverage XML per environment and for the project
    Coverage(SnapshotArgs),

    /// Write the project LCOV trace
    Lcov(SnapshotArgs),

    /// Write the project markdown summary
    Markdown(SnapshotArgs),

    /// Convert a system-test status text report to JUnit
    SystemTests(SystemTestsArgs),

    /// Show the resolved configuration
    Config(ConfigArgs),
}

/// Report options shared by the snapshot commands
#[derive(Args, Debug, Clone, Default)]
pub struct ReportArgs {
    /// Output directory [default: xml_data]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Prefix of LCOV source file paths
    #[arg(long)]
    pub source_root: Option<String>,

    /// Directory LCOV paths are made relative to
    /// [default: $CI_PROJECT_DIR, $WORKSPACE, or the working directory]
    #[arg(long)]
    pub project_dir: Option<String>,

    /// Output encoding label (defaults to the locale)
    #[arg(long)]
    pub encoding: Option<String>,

    /// Change-based testing lookup file (JSON)
    #[arg(long)]
    pub cbt: Option<PathBuf>,

    /// Only report this environment
    #[arg(short, long)]
    pub environment: Option<String>,
}

impl ReportArgs {
    /// Apply the given flags over `config`
    #[must_use]
    pub fn apply(&self, mut config: ReportConfig) -> ReportConfig {
        if let Some(ref dir) = self.output_dir {
            config.output_dir.clone_from(dir);
        }
        if let Some(ref root) = self.source_root {
            config.source_root.clone_from(root);
        }
        if self.project_dir.is_some() {
            config.project_dir.clone_from(&self.project_dir);
        }
        if self.encoding.is_some() {
            config.encoding.clone_from(&self.encoding);
        }
        if self.cbt.is_some() {
            config.cbt.clone_from(&self.cbt);
        }
        if self.environment.is_some() {
            config.environment.clone_from(&self.environment);
        }
        config
    }
}

/// Arguments for single-format commands
#[derive(Args, Debug, Clone)]
pub struct SnapshotArgs {
    /// Snapshot JSON file
    pub snapshot: PathBuf,

    /// Report options
    #[command(flatten)]
    pub report: ReportArgs,
}

/// Arguments for the generate command
#[derive(Args, Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct GenerateArgs {
    /// Snapshot JSON file
    pub snapshot: PathBuf,

    /// Write JUnit results
    #[arg(long)]
    pub junit: bool,

    /// Write coverage XML
    #[arg(long)]
    pub coverage: bool,

    /// Write the LCOV trace
    #[arg(long)]
    pub lcov: bool,

    /// Write the markdown summary
    #[arg(long)]
    pub markdown: bool,

    /// Report options
    #[command(flatten)]
    pub report: ReportArgs,
}

impl GenerateArgs {
    /// Formats picked on the command line, `None` when no flag was given
    #[must_use]
    pub const fn formats(&self) -> Option<ReportFormats> {
        let formats = ReportFormats {
            junit: self.junit,
            coverage: self.coverage,
            lcov: self.lcov,
            markdown: self.markdown,
        };
        if formats.is_empty() {
            None
        } else {
            Some(formats)
        }
    }
}

/// Arguments for the system-tests command
#[derive(Args, Debug, Clone)]
pub struct SystemTestsArgs {
    /// Status text report
    pub report: PathBuf,

    /// Output directory [default: xml_data]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Encoding of the report and of the written files [default: utf-8]
    #[arg(long)]
    pub encoding: Option<String>,
}

/// Arguments for the config command
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Print the resolved report configuration as YAML
    #[arg(long)]
    pub show: bool,

    /// Report options to resolve
    #[command(flatten)]
    pub report: ReportArgs,
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// JSON lines
    Json,
}

impl From<LogFormatArg> for crate::config::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}
