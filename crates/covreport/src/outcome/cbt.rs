//! Change-based testing lookup.
//!
//! The lookup file maps a build-directory key to the test cases that
//! incremental testing decided not to re-run, together with the timing of
//! the earlier run that is being reused.
//!
//! ```json
//! {
//!   "3f2a…": {
//!     "manager/Add_Party/TC1": {
//!       "passed": true,
//!       "start_time": "2026-10-17T09:00:00Z",
//!       "end_time": "2026-10-17T09:00:02.5Z"
//!     }
//!   }
//! }
//! ```

use crate::result::ReportResult;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Earlier result reused for a skipped test case
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CbtRecord {
    /// Whether the earlier run passed
    pub passed: bool,
    /// Start of the earlier run
    pub start_time: DateTime<Utc>,
    /// End of the earlier run
    pub end_time: DateTime<Utc>,
}

impl CbtRecord {
    /// Duration of the earlier run in seconds
    #[must_use]
    pub fn elapsed_secs(&self) -> f64 {
        (self.end_time - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}

/// Key of a build directory: md5 of its last two components, upper-cased
#[must_use]
pub fn build_dir_key(build_dir: &str) -> String {
    let normalized = build_dir.replace('\\', "/").to_uppercase();
    let parts: Vec<&str> = normalized.split('/').collect();
    let tail = parts[parts.len().saturating_sub(2)..].join("/");
    format!("{:x}", md5::compute(tail.as_bytes()))
}

/// All change-based testing records, keyed by build directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct CbtLookup {
    builds: HashMap<String, HashMap<String, CbtRecord>>,
}

impl CbtLookup {
    /// Lookup with no records
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a lookup from a JSON file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> ReportResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Add a record, mainly for tests and tooling
    pub fn insert(&mut self, build_dir: &str, test_id: impl Into<String>, record: CbtRecord) {
        self.builds
            .entry(build_dir_key(build_dir))
            .or_default()
            .insert(test_id.into(), record);
    }

    /// Records of one build directory
    #[must_use]
    pub fn scope(&self, build_dir: &str) -> CbtScope<'_> {
        CbtScope {
            records: self.builds.get(&build_dir_key(build_dir)),
        }
    }

    /// Whether the lookup has no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.builds.values().all(HashMap::is_empty)
    }
}

/// Records of one environment's build directory
#[derive(Debug, Clone, Copy, Default)]
pub struct CbtScope<'a> {
    records: Option<&'a HashMap<String, CbtRecord>>,
}

impl<'a> CbtScope<'a> {
    /// Record for a `unit/function/testcase` identifier
    #[must_use]
    pub fn get(&self, test_id: &str) -> Option<&'a CbtRecord> {
        self.records?.get(test_id)
    }
}
