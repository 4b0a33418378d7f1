//! Report configuration (`covreport.yaml`).
//!
//! ```yaml
//! output_dir: xml_data
//! source_root: /ci/src
//! encoding: utf-8
//! formats:
//!   junit: true
//!   coverage: true
//!   lcov: true
//!   markdown: false
//! ```

use crate::emit::resolve_encoding;
use crate::result::ReportResult;
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which reports to write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ReportFormats {
    /// `test_results_<env>.xml`
    pub junit: bool,
    /// `coverage_results_<env>.xml` and `project_coverage_results_<project>.xml`
    pub coverage: bool,
    /// `lcov/<project>.info`
    pub lcov: bool,
    /// `<project>_summary.md`
    pub markdown: bool,
}

impl Default for ReportFormats {
    fn default() -> Self {
        Self::all()
    }
}

impl ReportFormats {
    /// Every report
    #[must_use]
    pub const fn all() -> Self {
        Self {
            junit: true,
            coverage: true,
            lcov: true,
            markdown: true,
        }
    }

    /// No report
    #[must_use]
    pub const fn none() -> Self {
        Self {
            junit: false,
            coverage: false,
            lcov: false,
            markdown: false,
        }
    }

    /// Whether nothing is selected
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.junit || self.coverage || self.lcov || self.markdown)
    }
}

/// Resolved report settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory reports are written to
    pub output_dir: PathBuf,
    /// Prefix of LCOV `SF:` paths
    pub source_root: String,
    /// Directory LCOV paths are made relative to
    pub project_dir: Option<String>,
    /// Output encoding label; the locale when unset
    pub encoding: Option<String>,
    /// Change-based testing lookup file
    pub cbt: Option<PathBuf>,
    /// Only report this environment
    pub environment: Option<String>,
    /// Reports to write
    pub formats: ReportFormats,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("xml_data"),
            source_root: String::new(),
            project_dir: None,
            encoding: None,
            cbt: None,
            environment: None,
            formats: ReportFormats::all(),
        }
    }
}

impl ReportConfig {
    /// Config file looked up in the working directory
    pub const FILE_NAME: &'static str = "covreport.yaml";

    /// Create default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set output directory
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set LCOV source root
    #[must_use]
    pub fn with_source_root(mut self, root: impl Into<String>) -> Self {
        self.source_root = root.into();
        self
    }

    /// Set project directory
    #[must_use]
    pub fn with_project_dir(mut self, dir: impl Into<String>) -> Self {
        self.project_dir = Some(dir.into());
        self
    }

    /// Set output encoding label
    #[must_use]
    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = Some(label.into());
        self
    }

    /// Set change-based testing lookup file
    #[must_use]
    pub fn with_cbt(mut self, path: impl Into<PathBuf>) -> Self {
        self.cbt = Some(path.into());
        self
    }

    /// Restrict to one environment
    #[must_use]
    pub fn with_environment(mut self, name: impl Into<String>) -> Self {
        self.environment = Some(name.into());
        self
    }

    /// Select reports
    #[must_use]
    pub const fn with_formats(mut self, formats: ReportFormats) -> Self {
        self.formats = formats;
        self
    }

    /// Parse YAML configuration
    ///
    /// # Errors
    ///
    /// Returns error if the YAML is malformed
    pub fn from_yaml(yaml: &str) -> ReportResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Serialize to YAML
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_yaml(&self) -> ReportResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Load a config file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> ReportResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&text)?;
        debug!(path = %path.display(), "loaded report config");
        Ok(config)
    }

    /// Load `covreport.yaml` from `dir` if it exists
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn discover(dir: &Path) -> ReportResult<Option<Self>> {
        let path = dir.join(Self::FILE_NAME);
        if path.is_file() {
            Self::load(&path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Project directory: configured value, else `CI_PROJECT_DIR`, else
    /// `WORKSPACE`, else `cwd`
    #[must_use]
    pub fn project_dir_with<F>(&self, lookup: F, cwd: &Path) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        self.project_dir
            .clone()
            .or_else(|| lookup("CI_PROJECT_DIR"))
            .or_else(|| lookup("WORKSPACE"))
            .unwrap_or_else(|| cwd.to_string_lossy().into_owned())
            .replace('\\', "/")
    }

    /// Project directory resolved from the process environment
    #[must_use]
    pub fn resolved_project_dir(&self) -> String {
        let cwd = std::env::current_dir().unwrap_or_default();
        self.project_dir_with(|var| std::env::var(var).ok(), &cwd)
    }

    /// Output encoding: the configured label, else the locale
    ///
    /// # Errors
    ///
    /// Returns error if the configured label is unknown
    pub fn output_encoding(&self) -> ReportResult<&'static Encoding> {
        resolve_encoding(self.encoding.as_deref())
    }

    /// JUnit file of an environment
    #[must_use]
    pub fn junit_path(&self, environment: &str) -> PathBuf {
        self.output_dir
            .join(format!("test_results_{environment}.xml"))
    }

    /// Coverage XML file of an environment
    #[must_use]
    pub fn coverage_path(&self, environment: &str) -> PathBuf {
        self.output_dir
            .join(format!("coverage_results_{environment}.xml"))
    }

    /// Coverage XML file of a project, never shared with an environment
    #[must_use]
    pub fn project_coverage_path(&self, project: &str) -> PathBuf {
        self.output_dir
            .join(format!("project_coverage_results_{project}.xml"))
    }

    /// LCOV trace of a project
    #[must_use]
    pub fn lcov_path(&self, project: &str) -> PathBuf {
        self.output_dir.join("lcov").join(format!("{project}.info"))
    }

    /// Markdown summary of a project
    #[must_use]
    pub fn markdown_path(&self, project: &str) -> PathBuf {
        self.output_dir.join(format!("{project}_summary.md"))
    }
}
